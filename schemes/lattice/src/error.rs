//! Error types for the lattice adapters.

use thiserror::Error;

/// Errors that can occur in lattice signature and KEM operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    /// Key, signature or ciphertext of the wrong size.
    #[error("malformed {field}: expected {expected} bytes, got {actual}")]
    MalformedInput {
        /// What was being parsed.
        field: &'static str,
        /// Expected length in bytes.
        expected: usize,
        /// Length actually provided.
        actual: usize,
    },

    /// A signed message did not open under the given public key.
    #[error("signature verification failed")]
    VerificationFailed,

    /// The KEM backend rejected an operation.
    #[error("key encapsulation failed during {0}")]
    Encapsulation(&'static str),
}

/// Result type alias for lattice operations.
pub type Result<T> = std::result::Result<T, LatticeError>;
