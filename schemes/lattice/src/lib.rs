//! # pqsigs-lattice
//!
//! Lattice-based companions to the XMSS crate: Dilithium signatures and
//! Kyber (ML-KEM-768) key encapsulation, each wrapped behind a small
//! capability trait. The primitives themselves come from audited
//! implementations; this crate only fixes the byte-level contract.
//!
//! ## Example
//!
//! ```rust
//! use pqsigs_lattice::{Dilithium, KeyEncapsulation, Kyber, LatticeSignature};
//!
//! let signer = Dilithium::new();
//! let signed = signer.sign(b"hello");
//! let opened = Dilithium::sign_open(&signed, &signer.public_key()).unwrap();
//! assert_eq!(opened, b"hello");
//!
//! let mut alice = Kyber::new();
//! let mut bob = Kyber::new();
//! alice.kem_encode(&bob.public_key()).unwrap();
//! bob.kem_decode(alice.cypher_text()).unwrap();
//! assert_eq!(alice.my_key(), bob.my_key());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod dilithium;
pub mod error;
pub mod kyber;

pub use dilithium::Dilithium;
pub use error::{LatticeError, Result};
pub use kyber::Kyber;

use zeroize::Zeroizing;

/// A signature scheme whose signed messages carry the signature up front.
pub trait LatticeSignature {
    /// Public key size in bytes.
    const PUBLIC_KEY_SIZE: usize;
    /// Secret key size in bytes.
    const SECRET_KEY_SIZE: usize;
    /// Detached signature size in bytes.
    const SIGNATURE_SIZE: usize;

    /// Serialized public key.
    fn public_key(&self) -> Vec<u8>;

    /// Serialized secret key, wiped when dropped.
    fn secret_key(&self) -> Zeroizing<Vec<u8>>;

    /// Signs `message`, returning `signature || message`.
    fn sign(&self, message: &[u8]) -> Vec<u8>;

    /// Checks a signed message and returns the message it carries.
    fn sign_open(signed: &[u8], public_key: &[u8]) -> Result<Vec<u8>>;

    /// The message part of a signed message, without checking the signature.
    fn extract_message(signed: &[u8]) -> Result<Vec<u8>> {
        split_signed::<Self>(signed).map(|(_, message)| message.to_vec())
    }

    /// The signature part of a signed message.
    fn extract_signature(signed: &[u8]) -> Result<Vec<u8>> {
        split_signed::<Self>(signed).map(|(signature, _)| signature.to_vec())
    }
}

fn split_signed<S: LatticeSignature + ?Sized>(signed: &[u8]) -> Result<(&[u8], &[u8])> {
    if signed.len() < S::SIGNATURE_SIZE {
        return Err(LatticeError::MalformedInput {
            field: "signed message",
            expected: S::SIGNATURE_SIZE,
            actual: signed.len(),
        });
    }
    Ok(signed.split_at(S::SIGNATURE_SIZE))
}

/// A key encapsulation mechanism that remembers its last exchange.
///
/// After a successful [`kem_encode`](Self::kem_encode) the ciphertext to
/// send is in [`cypher_text`](Self::cypher_text); after either call the
/// shared key is in [`my_key`](Self::my_key).
pub trait KeyEncapsulation {
    /// Public key size in bytes.
    const PUBLIC_KEY_SIZE: usize;
    /// Secret key size in bytes.
    const SECRET_KEY_SIZE: usize;
    /// Ciphertext size in bytes.
    const CIPHERTEXT_SIZE: usize;
    /// Shared key size in bytes.
    const SHARED_KEY_SIZE: usize;

    /// Serialized public key.
    fn public_key(&self) -> Vec<u8>;

    /// Serialized secret key, wiped when dropped.
    fn secret_key(&self) -> Zeroizing<Vec<u8>>;

    /// Encapsulates a fresh shared key against `other_public_key`.
    fn kem_encode(&mut self, other_public_key: &[u8]) -> Result<bool>;

    /// Recovers the shared key from a peer's ciphertext.
    fn kem_decode(&mut self, ciphertext: &[u8]) -> Result<bool>;

    /// Ciphertext of the last exchange; empty before the first one.
    fn cypher_text(&self) -> &[u8];

    /// Shared key of the last exchange; empty before the first one.
    fn my_key(&self) -> &[u8];
}
