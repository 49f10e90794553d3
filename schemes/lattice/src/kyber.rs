//! Kyber key encapsulation at the 768 security level (ML-KEM-768).
//!
//! One party encapsulates against the other's public key and sends the
//! ciphertext; the other decapsulates it with its secret key. Both end up
//! with the same 32-byte shared key.
//!
//! Decapsulation uses implicit rejection: a ciphertext that was not made
//! for this key still yields a key, unrelated to the sender's.

use crate::error::{LatticeError, Result};
use crate::KeyEncapsulation;
use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{EncodedSizeUser, KemCore, MlKem768};
use rand::rngs::OsRng;
use tracing::{debug, trace};
use zeroize::Zeroizing;

type EK = <MlKem768 as KemCore>::EncapsulationKey;
type DK = <MlKem768 as KemCore>::DecapsulationKey;

/// Encapsulation (public) key size in bytes.
pub const PUBLIC_KEY_SIZE: usize = 1184;

/// Decapsulation (secret) key size in bytes.
pub const SECRET_KEY_SIZE: usize = 2400;

/// Ciphertext size in bytes.
pub const CIPHERTEXT_SIZE: usize = 1088;

/// Shared key size in bytes.
pub const SHARED_KEY_SIZE: usize = 32;

/// Kyber key pair plus the state of the last exchange.
pub struct Kyber {
    ek: EK,
    dk: DK,
    ciphertext: Vec<u8>,
    key: Zeroizing<Vec<u8>>,
}

impl Kyber {
    /// Generates a fresh key pair.
    pub fn new() -> Self {
        let (dk, ek) = MlKem768::generate(&mut OsRng);
        debug!("kyber key pair generated");
        Kyber {
            ek,
            dk,
            ciphertext: Vec::new(),
            key: Zeroizing::new(Vec::new()),
        }
    }

    /// Rebuilds a key pair from its serialized halves.
    pub fn from_keys(public_key: &[u8], secret_key: &[u8]) -> Result<Self> {
        Ok(Kyber {
            ek: parse_public_key(public_key)?,
            dk: parse_secret_key(secret_key)?,
            ciphertext: Vec::new(),
            key: Zeroizing::new(Vec::new()),
        })
    }
}

impl Default for Kyber {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_public_key(bytes: &[u8]) -> Result<EK> {
    let encoded: ml_kem::Encoded<EK> =
        bytes
            .try_into()
            .map_err(|_| LatticeError::MalformedInput {
                field: "public key",
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            })?;
    Ok(EK::from_bytes(&encoded))
}

fn parse_secret_key(bytes: &[u8]) -> Result<DK> {
    let encoded: ml_kem::Encoded<DK> =
        bytes
            .try_into()
            .map_err(|_| LatticeError::MalformedInput {
                field: "secret key",
                expected: SECRET_KEY_SIZE,
                actual: bytes.len(),
            })?;
    Ok(DK::from_bytes(&encoded))
}

impl KeyEncapsulation for Kyber {
    const PUBLIC_KEY_SIZE: usize = PUBLIC_KEY_SIZE;
    const SECRET_KEY_SIZE: usize = SECRET_KEY_SIZE;
    const CIPHERTEXT_SIZE: usize = CIPHERTEXT_SIZE;
    const SHARED_KEY_SIZE: usize = SHARED_KEY_SIZE;

    fn public_key(&self) -> Vec<u8> {
        let encoded = self.ek.as_bytes();
        AsRef::<[u8]>::as_ref(&encoded).to_vec()
    }

    fn secret_key(&self) -> Zeroizing<Vec<u8>> {
        let encoded = self.dk.as_bytes();
        Zeroizing::new(AsRef::<[u8]>::as_ref(&encoded).to_vec())
    }

    fn kem_encode(&mut self, other_public_key: &[u8]) -> Result<bool> {
        let ek = parse_public_key(other_public_key)?;
        let (ct, shared) = ek
            .encapsulate(&mut OsRng)
            .map_err(|_| LatticeError::Encapsulation("encapsulate"))?;

        self.ciphertext = AsRef::<[u8]>::as_ref(&ct).to_vec();
        self.key = Zeroizing::new(AsRef::<[u8]>::as_ref(&shared).to_vec());
        trace!("kyber shared key encapsulated");
        Ok(true)
    }

    fn kem_decode(&mut self, ciphertext: &[u8]) -> Result<bool> {
        let ct: ml_kem::Ciphertext<MlKem768> =
            ciphertext
                .try_into()
                .map_err(|_| LatticeError::MalformedInput {
                    field: "ciphertext",
                    expected: CIPHERTEXT_SIZE,
                    actual: ciphertext.len(),
                })?;
        let shared = self
            .dk
            .decapsulate(&ct)
            .map_err(|_| LatticeError::Encapsulation("decapsulate"))?;

        self.ciphertext = ciphertext.to_vec();
        self.key = Zeroizing::new(AsRef::<[u8]>::as_ref(&shared).to_vec());
        trace!("kyber shared key decapsulated");
        Ok(true)
    }

    fn cypher_text(&self) -> &[u8] {
        &self.ciphertext
    }

    fn my_key(&self) -> &[u8] {
        &self.key
    }
}
