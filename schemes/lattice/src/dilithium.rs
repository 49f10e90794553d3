//! Dilithium (security level 5) signatures through PQClean bindings.
//!
//! A signed message is the signature followed by the message, as produced
//! by the reference `crypto_sign`.

use crate::error::{LatticeError, Result};
use crate::LatticeSignature;
use pqcrypto_dilithium::dilithium5;
use pqcrypto_traits::sign::{PublicKey as _, SecretKey as _, SignedMessage as _};
use tracing::debug;
use zeroize::Zeroizing;

/// Public key size in bytes.
pub const PUBLIC_KEY_SIZE: usize = dilithium5::public_key_bytes();

/// Secret key size in bytes.
pub const SECRET_KEY_SIZE: usize = dilithium5::secret_key_bytes();

/// Signature size in bytes.
pub const SIGNATURE_SIZE: usize = dilithium5::signature_bytes();

/// Dilithium key pair.
pub struct Dilithium {
    pk: dilithium5::PublicKey,
    sk: dilithium5::SecretKey,
}

impl Dilithium {
    /// Generates a fresh key pair.
    pub fn new() -> Self {
        let (pk, sk) = dilithium5::keypair();
        debug!("dilithium key pair generated");
        Dilithium { pk, sk }
    }

    /// Rebuilds a key pair from its serialized halves.
    pub fn from_keys(public_key: &[u8], secret_key: &[u8]) -> Result<Self> {
        let pk = dilithium5::PublicKey::from_bytes(public_key).map_err(|_| {
            LatticeError::MalformedInput {
                field: "public key",
                expected: PUBLIC_KEY_SIZE,
                actual: public_key.len(),
            }
        })?;
        let sk = dilithium5::SecretKey::from_bytes(secret_key).map_err(|_| {
            LatticeError::MalformedInput {
                field: "secret key",
                expected: SECRET_KEY_SIZE,
                actual: secret_key.len(),
            }
        })?;
        Ok(Dilithium { pk, sk })
    }
}

impl Default for Dilithium {
    fn default() -> Self {
        Self::new()
    }
}

impl LatticeSignature for Dilithium {
    const PUBLIC_KEY_SIZE: usize = PUBLIC_KEY_SIZE;
    const SECRET_KEY_SIZE: usize = SECRET_KEY_SIZE;
    const SIGNATURE_SIZE: usize = SIGNATURE_SIZE;

    fn public_key(&self) -> Vec<u8> {
        self.pk.as_bytes().to_vec()
    }

    fn secret_key(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.sk.as_bytes().to_vec())
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        dilithium5::sign(message, &self.sk).as_bytes().to_vec()
    }

    fn sign_open(signed: &[u8], public_key: &[u8]) -> Result<Vec<u8>> {
        let pk = dilithium5::PublicKey::from_bytes(public_key).map_err(|_| {
            LatticeError::MalformedInput {
                field: "public key",
                expected: PUBLIC_KEY_SIZE,
                actual: public_key.len(),
            }
        })?;
        if signed.len() < SIGNATURE_SIZE {
            return Err(LatticeError::MalformedInput {
                field: "signed message",
                expected: SIGNATURE_SIZE,
                actual: signed.len(),
            });
        }
        let sm = dilithium5::SignedMessage::from_bytes(signed).map_err(|_| {
            LatticeError::MalformedInput {
                field: "signed message",
                expected: SIGNATURE_SIZE,
                actual: signed.len(),
            }
        })?;
        dilithium5::open(&sm, &pk).map_err(|_| LatticeError::VerificationFailed)
    }
}
