//! Error types for XMSS signer, codec and pool operations.

use thiserror::Error;

/// Errors that can occur during XMSS operations.
///
/// A cryptographically invalid signature is not an error: verification
/// reports it as `Ok(false)`. These variants cover caller contract
/// violations and exhausted state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmssError {
    /// Bad construction argument (height, seed length, count).
    #[error("invalid parameter '{field}': {reason}")]
    InvalidParameter {
        /// The name of the invalid parameter.
        field: &'static str,
        /// Description of why the parameter is invalid.
        reason: &'static str,
    },

    /// Input length does not match the declared parameters.
    #[error("malformed {field}: expected {expected} bytes, got {actual}")]
    MalformedInput {
        /// What was being parsed.
        field: &'static str,
        /// Expected length in bytes.
        expected: usize,
        /// Length actually provided.
        actual: usize,
    },

    /// Every one-time key of the tree has been used.
    #[error("all {capacity} one-time keys have been used")]
    KeyExhausted {
        /// Number of leaves in the tree.
        capacity: u64,
    },

    /// Explicit index repositioning beyond the tree capacity.
    #[error("index {index} is out of range for a tree of {capacity} leaves")]
    IndexOutOfRange {
        /// The requested index.
        index: u64,
        /// Number of leaves in the tree.
        capacity: u64,
    },

    /// The traversal state can only move forward.
    #[error("cannot rewind from index {current} to {requested}")]
    IndexRewind {
        /// Index the signer currently sits at.
        current: u32,
        /// The requested, earlier index.
        requested: u32,
    },

    /// Unknown descriptor tag or an operation the hash family lacks.
    #[error("unsupported {field} tag {tag}")]
    UnsupportedAlgorithm {
        /// Which tag was rejected.
        field: &'static str,
        /// The rejected tag value.
        tag: u8,
    },

    /// Non-blocking pool retrieval found nothing ready.
    #[error("no precomputed tree is ready")]
    PoolEmpty,
}

/// Result type alias for XMSS operations.
pub type Result<T> = std::result::Result<T, XmssError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = XmssError::MalformedInput {
            field: "signature",
            expected: 2308,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "malformed signature: expected 2308 bytes, got 12"
        );

        let err = XmssError::IndexOutOfRange {
            index: 16,
            capacity: 16,
        };
        assert_eq!(
            err.to_string(),
            "index 16 is out of range for a tree of 16 leaves"
        );
    }
}
