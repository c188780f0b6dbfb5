//! `crypto_box` backed implementation of the crypto capability.

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox};
use rand::rngs::OsRng;
use rand::RngCore;

use super::keys::{KeyPair, PUBLIC_KEY_SIZE};
use crate::error::CryptoError;

/// Size of an XSalsa20 nonce.
pub const NONCE_SIZE: usize = 24;

/// Size of the Poly1305 authentication tag.
pub const MAC_BYTES: usize = 16;

/// Zero padding that prefixes NaCl `crypto_box` output. It carries no
/// information and is stripped before anything goes on the wire.
pub const BOX_ZERO_BYTES: usize = 16;

/// Precomputed key shared between our keypair and one peer.
pub struct SharedKey(SalsaBox);

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedKey(..)")
    }
}

/// Narrow interface over the crypto primitives the probes need.
pub trait CryptoProvider: Send + Sync {
    /// Our long-term public key.
    fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE];

    /// Fresh keypair, used for per-handshake session keys.
    fn generate_keypair(&self) -> Result<KeyPair, CryptoError>;

    /// Shared key between our long-term secret key and `peer`.
    fn shared_key(&self, peer: &[u8; PUBLIC_KEY_SIZE]) -> SharedKey;

    /// Encrypt `plain` in the NaCl `crypto_box_afternm` layout:
    /// `[BOX_ZERO_BYTES zeros][tag][ciphertext]`.
    fn encrypt(
        &self,
        key: &SharedKey,
        nonce: &[u8; NONCE_SIZE],
        plain: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Decrypt the compact wire form `[tag][ciphertext]`.
    fn decrypt(
        &self,
        key: &SharedKey,
        nonce: &[u8; NONCE_SIZE],
        sealed: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    fn nonce(&self) -> [u8; NONCE_SIZE];

    fn random_bytes(&self, len: usize) -> Vec<u8>;
}

/// Default provider: X25519 + XSalsa20-Poly1305 via the `crypto_box` crate.
#[derive(Debug, Clone)]
pub struct BoxCryptoProvider {
    keypair: KeyPair,
}

impl BoxCryptoProvider {
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Provider with a freshly generated long-term keypair.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self::new(KeyPair::generate()?))
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }
}

impl CryptoProvider for BoxCryptoProvider {
    fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.keypair.public_key()
    }

    fn generate_keypair(&self) -> Result<KeyPair, CryptoError> {
        KeyPair::generate()
    }

    fn shared_key(&self, peer: &[u8; PUBLIC_KEY_SIZE]) -> SharedKey {
        let peer = PublicKey::from(*peer);
        SharedKey(SalsaBox::new(&peer, self.keypair.secret()))
    }

    fn encrypt(
        &self,
        key: &SharedKey,
        nonce: &[u8; NONCE_SIZE],
        plain: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        // SalsaBox already yields tag || ciphertext
        let sealed = key
            .0
            .encrypt(GenericArray::from_slice(nonce), plain)
            .map_err(|_| CryptoError::Encrypt)?;

        let mut boxed = Vec::with_capacity(BOX_ZERO_BYTES + sealed.len());
        boxed.resize(BOX_ZERO_BYTES, 0);
        boxed.extend_from_slice(&sealed);
        Ok(boxed)
    }

    fn decrypt(
        &self,
        key: &SharedKey,
        nonce: &[u8; NONCE_SIZE],
        sealed: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        key.0.decrypt(GenericArray::from_slice(nonce), sealed).map_err(|_| CryptoError::Decrypt)
    }

    fn nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }

    fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }
}
