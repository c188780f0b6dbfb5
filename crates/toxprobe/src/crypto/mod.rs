//! Cryptographic capability used by the probe engine.
//!
//! Everything goes through [`CryptoProvider`]:
//! - Curve25519 keypair generation
//! - shared key precomputation with a node's long-term key
//! - XSalsa20-Poly1305 authenticated encryption (NaCl `crypto_box`)
//! - nonce and random byte generation

pub mod keys;
pub mod provider;

pub use keys::{KeyPair, PUBLIC_KEY_SIZE, decode_public_key};
pub use provider::{
    BOX_ZERO_BYTES, BoxCryptoProvider, CryptoProvider, MAC_BYTES, NONCE_SIZE, SharedKey,
};
