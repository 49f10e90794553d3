//! Plain digest and XOF helpers for callers outside the signature engine.

use crate::error::{Result, XmssError};
use sha2::{Digest, Sha256};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128, Shake256,
};

/// SHA2-256 digest of `input`.
pub fn sha2_256(input: &[u8]) -> [u8; 32] {
    Sha256::digest(input).into()
}

/// SHA2-256 applied `count` times, each round hashing the previous digest.
///
/// Used for key-derivation hardening. A count of zero is rejected.
pub fn sha2_256_n(input: &[u8], count: usize) -> Result<[u8; 32]> {
    if count == 0 {
        return Err(XmssError::InvalidParameter {
            field: "count",
            reason: "at least one round is required",
        });
    }
    let mut digest = sha2_256(input);
    for _ in 1..count {
        digest = sha2_256(&digest);
    }
    Ok(digest)
}

/// SHAKE128 with `out_len` bytes of output.
pub fn shake128(out_len: usize, input: &[u8]) -> Vec<u8> {
    let mut output = vec![0u8; out_len];
    let mut hasher = Shake128::default();
    hasher.update(input);
    hasher.finalize_xof().read(&mut output);
    output
}

/// SHAKE256 with `out_len` bytes of output.
pub fn shake256(out_len: usize, input: &[u8]) -> Vec<u8> {
    let mut output = vec![0u8; out_len];
    let mut hasher = Shake256::default();
    hasher.update(input);
    hasher.finalize_xof().read(&mut output);
    output
}
