//! Error types for the probing engine.
//!
//! Phase errors stay local to the phase (and port) that produced them. Only
//! directory and startup errors leave their origin.

use std::io;

use thiserror::Error;

/// Failure of one probe phase against one node (or one port in phase C).
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("invalid public key {key:?}: {reason}")]
    InvalidPublicKey { key: String, reason: String },

    #[error("connect to {addr} timed out")]
    ConnectTimeout { addr: String },

    #[error("read from {addr} timed out")]
    ReadTimeout { addr: String },

    #[error("i/o error talking to {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("packet id {0} is not a bootstrap info packet")]
    UnexpectedPacketId(u8),

    #[error("bootstrap info packet too small ({0} bytes)")]
    InfoTooShort(usize),

    #[error("tcp handshake response has an incorrect length ({got} of {expected} bytes)")]
    HandshakeLength { got: usize, expected: usize },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Failure inside the crypto provider.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed (wrong key or tampered data)")]
    Decrypt,

    #[error("sealed box is shorter than its {0}-byte prefix")]
    MissingPrefix(usize),

    #[error("random number generator failed: {0}")]
    Rng(String),
}

/// The node directory could not be fetched; the whole cycle is skipped.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request to {uri} failed: {source}")]
    Http {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("directory source {uri} answered with status {status}")]
    Status { uri: String, status: u16 },

    #[error("could not read directory file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Fatal errors before the service starts scanning or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not generate keypair: {0}")]
    Keypair(String),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
