//! Curve25519 keypairs.

use crypto_box::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, PhaseError};

/// Size of a Curve25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Long-term (or ephemeral) Curve25519 keypair.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh keypair from the OS random source.
    ///
    /// Fails instead of panicking when the random source is unavailable.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; 32];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(Self::from_secret_bytes(bytes))
    }

    /// Rebuild a keypair from a 32-byte secret key.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = SecretKey::from(bytes);
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        *self.public.as_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(self.public.as_bytes())
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair").field("public", &self.public_key_hex()).finish_non_exhaustive()
    }
}

/// Decode a hex public key from the directory; it must be exactly 32 bytes.
pub fn decode_public_key(key: &str) -> Result<[u8; PUBLIC_KEY_SIZE], PhaseError> {
    let invalid = |reason: String| PhaseError::InvalidPublicKey { key: key.to_string(), reason };

    let bytes = hex::decode(key).map_err(|e| invalid(e.to_string()))?;
    <[u8; PUBLIC_KEY_SIZE]>::try_from(bytes.as_slice())
        .map_err(|_| invalid(format!("expected {PUBLIC_KEY_SIZE} bytes, got {}", bytes.len())))
}
