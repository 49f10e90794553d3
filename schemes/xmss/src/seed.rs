//! Seed generation and derivation helpers.

use crate::hashing::shake256;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

/// Draws `size` bytes from the OS generator, appends caller entropy and
/// condenses the result with SHAKE256 to `size` bytes.
pub fn random_seed(size: usize, entropy: &[u8]) -> Vec<u8> {
    let mut material = vec![0u8; size];
    OsRng.fill_bytes(&mut material);
    material.extend_from_slice(entropy);

    let seed = shake256(size, &material);
    material.zeroize();
    seed
}

/// Derives `count` 32-byte seeds from one seed.
///
/// Seed i is `SHAKE256-32(seed || shift || i)` with `shift` and `i` as
/// little-endian u32.
pub fn hash_chain_seed(seed: &[u8], shift: u32, count: u32) -> Vec<[u8; 32]> {
    let mut buf = Vec::with_capacity(seed.len() + 8);
    buf.extend_from_slice(seed);
    buf.extend_from_slice(&shift.to_le_bytes());
    buf.extend_from_slice(&[0u8; 4]);
    let tail = seed.len() + 4;

    let seeds = (0..count)
        .map(|i| {
            buf[tail..].copy_from_slice(&i.to_le_bytes());
            let mut out = [0u8; 32];
            out.copy_from_slice(&shake256(32, &buf));
            out
        })
        .collect();
    buf.zeroize();
    seeds
}
