//! WOTS+ (Winternitz One-Time Signature) for XMSS leaves.
//!
//! Each XMSS leaf is a WOTS+ key pair. The leaf's secret chains are
//! expanded from a per-leaf seed, and the leaf's public value is the
//! L-tree compression of the 67 chain ends.
//!
//! # Overview
//!
//! 1. The 32-byte digest is split into 64 base-16 digits
//! 2. A 3-digit checksum blocks forgeries that advance chain positions
//! 3. Digit i selects how far chain i is revealed in the signature
//! 4. A verifier completes every chain and recompresses the public key
//!
//! # Security
//!
//! A leaf may sign exactly once. This module is stateless and does not
//! track reuse; the signer's index does.

use crate::adrs::{AddressType, HashAddress};
use crate::hash::{hash_f, hash_h, prf, to_byte32, HashFunction};
use crate::params::{LOG_W, N, W, WOTS_LEN, WOTS_LEN1, WOTS_LEN2};

/// Computes a WOTS+ hash chain.
///
/// Applies F `steps` times starting at chain position `start`, never past
/// position w - 1.
pub fn chain(
    hash_fn: HashFunction,
    x: &[u8; N],
    start: u32,
    steps: u32,
    pub_seed: &[u8; N],
    adrs: &mut HashAddress,
) -> [u8; N] {
    let mut tmp = *x;
    for i in start..(start + steps).min(W - 1) {
        adrs.set_hash(i);
        tmp = hash_f(hash_fn, &tmp, pub_seed, adrs);
    }
    tmp
}

/// Derives the seed of the WOTS+ key pair at `leaf_index`.
///
/// seed = PRF(SK.seed, ADRS) with chain, hash and key-and-mask cleared.
pub fn leaf_seed(hash_fn: HashFunction, sk_seed: &[u8; N], leaf_index: u32) -> [u8; N] {
    let mut adrs = HashAddress::new(AddressType::Ots);
    adrs.set_ots(leaf_index);
    prf(hash_fn, sk_seed, &adrs.to_bytes())
}

/// Expands a leaf seed into the secret start of chain `i`.
#[inline]
fn chain_secret(hash_fn: HashFunction, seed: &[u8; N], i: usize) -> [u8; N] {
    prf(hash_fn, seed, &to_byte32(i as u64))
}

/// Generates the 67 chain ends of a WOTS+ public key.
pub fn wots_pk_gen(
    hash_fn: HashFunction,
    seed: &[u8; N],
    pub_seed: &[u8; N],
    adrs: &mut HashAddress,
) -> Vec<[u8; N]> {
    (0..WOTS_LEN)
        .map(|i| {
            let sk_i = chain_secret(hash_fn, seed, i);
            adrs.set_chain(i as u32);
            chain(hash_fn, &sk_i, 0, W - 1, pub_seed, adrs)
        })
        .collect()
}

/// Generates a WOTS+ signature on a 32-byte digest.
pub fn wots_sign(
    hash_fn: HashFunction,
    digest: &[u8; N],
    seed: &[u8; N],
    pub_seed: &[u8; N],
    adrs: &mut HashAddress,
) -> Vec<[u8; N]> {
    let lengths = chain_lengths(digest);

    lengths
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            let sk_i = chain_secret(hash_fn, seed, i);
            adrs.set_chain(i as u32);
            chain(hash_fn, &sk_i, 0, len, pub_seed, adrs)
        })
        .collect()
}

/// Recovers the chain ends of the public key from a signature.
pub fn wots_pk_from_sig(
    hash_fn: HashFunction,
    sig: &[[u8; N]],
    digest: &[u8; N],
    pub_seed: &[u8; N],
    adrs: &mut HashAddress,
) -> Vec<[u8; N]> {
    let lengths = chain_lengths(digest);

    sig.iter()
        .zip(lengths.iter())
        .enumerate()
        .map(|(i, (sig_i, &len))| {
            adrs.set_chain(i as u32);
            chain(hash_fn, sig_i, len, W - 1 - len, pub_seed, adrs)
        })
        .collect()
}

/// Compresses WOTS+ chain ends into one node with an unbalanced L-tree.
///
/// Nodes are hashed pairwise; an odd node out is carried to the next level
/// unchanged.
pub fn l_tree(
    hash_fn: HashFunction,
    mut nodes: Vec<[u8; N]>,
    pub_seed: &[u8; N],
    adrs: &mut HashAddress,
) -> [u8; N] {
    let mut len = nodes.len();
    let mut height = 0;
    adrs.set_tree_height(height);

    while len > 1 {
        for i in 0..len / 2 {
            adrs.set_tree_index(i as u32);
            nodes[i] = hash_h(hash_fn, &nodes[2 * i], &nodes[2 * i + 1], pub_seed, adrs);
        }
        if len % 2 == 1 {
            nodes[len / 2] = nodes[len - 1];
            len = len / 2 + 1;
        } else {
            len /= 2;
        }
        height += 1;
        adrs.set_tree_height(height);
    }

    nodes.first().copied().unwrap_or([0u8; N])
}

/// Derives the public value of the leaf at `leaf_index`.
///
/// Deterministic in (sk_seed, pub_seed, leaf_index).
pub fn derive_leaf(
    hash_fn: HashFunction,
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    leaf_index: u32,
) -> [u8; N] {
    let seed = leaf_seed(hash_fn, sk_seed, leaf_index);
    let mut ots_adrs = HashAddress::new(AddressType::Ots);
    ots_adrs.set_ots(leaf_index);
    let pk = wots_pk_gen(hash_fn, &seed, pub_seed, &mut ots_adrs);

    let mut ltree_adrs = HashAddress::new(AddressType::LTree);
    ltree_adrs.set_ltree(leaf_index);
    l_tree(hash_fn, pk, pub_seed, &mut ltree_adrs)
}

/// Signs `digest` with the one-time key at `leaf_index`.
///
/// Must be called at most once per leaf for a given secret seed.
pub fn sign_leaf(
    hash_fn: HashFunction,
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    leaf_index: u32,
    digest: &[u8; N],
) -> Vec<[u8; N]> {
    let seed = leaf_seed(hash_fn, sk_seed, leaf_index);
    let mut ots_adrs = HashAddress::new(AddressType::Ots);
    ots_adrs.set_ots(leaf_index);
    wots_sign(hash_fn, digest, &seed, pub_seed, &mut ots_adrs)
}

/// Recomputes the leaf public value implied by a one-time signature.
pub fn leaf_from_sig(
    hash_fn: HashFunction,
    sig: &[[u8; N]],
    digest: &[u8; N],
    pub_seed: &[u8; N],
    leaf_index: u32,
) -> [u8; N] {
    let mut ots_adrs = HashAddress::new(AddressType::Ots);
    ots_adrs.set_ots(leaf_index);
    let pk = wots_pk_from_sig(hash_fn, sig, digest, pub_seed, &mut ots_adrs);

    let mut ltree_adrs = HashAddress::new(AddressType::LTree);
    ltree_adrs.set_ltree(leaf_index);
    l_tree(hash_fn, pk, pub_seed, &mut ltree_adrs)
}

/// Checks a one-time signature against a leaf public value.
///
/// A mismatch is reported as `false`, never as an error.
pub fn verify_leaf(
    hash_fn: HashFunction,
    digest: &[u8; N],
    sig: &[[u8; N]],
    pub_seed: &[u8; N],
    leaf_index: u32,
    leaf: &[u8; N],
) -> bool {
    if sig.len() != WOTS_LEN {
        return false;
    }
    leaf_from_sig(hash_fn, sig, digest, pub_seed, leaf_index) == *leaf
}

/// Chain lengths for a digest: its base-w digits followed by the checksum.
fn chain_lengths(digest: &[u8; N]) -> [u32; WOTS_LEN] {
    let mut lengths = [0u32; WOTS_LEN];
    let msg_base_w = base_w(digest, WOTS_LEN1);
    let csum = compute_checksum(&msg_base_w);
    let csum_base_w = checksum_to_base_w(csum);

    for (dst, src) in lengths
        .iter_mut()
        .zip(msg_base_w.iter().chain(csum_base_w.iter()))
    {
        *dst = *src;
    }
    lengths
}

/// Converts a byte string to base-w digits (nibbles for w = 16).
fn base_w(input: &[u8], out_len: usize) -> Vec<u32> {
    let mut output = Vec::with_capacity(out_len);
    let mut bits = 0u32;
    let mut total = 0u32;
    let mut bytes = input.iter();

    for _ in 0..out_len {
        if bits == 0 {
            total = u32::from(bytes.next().copied().unwrap_or(0));
            bits = 8;
        }
        bits -= LOG_W;
        output.push((total >> bits) & (W - 1));
    }
    output
}

/// csum = sum(w - 1 - msg[i])
fn compute_checksum(msg_base_w: &[u32]) -> u32 {
    msg_base_w.iter().map(|&d| W - 1 - d).sum()
}

/// Encodes the checksum as len2 base-w digits, most significant first.
fn checksum_to_base_w(csum: u32) -> Vec<u32> {
    let shift = 8 - ((WOTS_LEN2 as u32 * LOG_W) % 8);
    let csum_bytes = ((csum << shift) as u16).to_be_bytes();
    base_w(&csum_bytes, WOTS_LEN2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: HashFunction = HashFunction::Shake128;

    #[test]
    fn test_base_w_conversion() {
        let input = [0xAB, 0xCD];
        assert_eq!(base_w(&input, 4), vec![0xA, 0xB, 0xC, 0xD]);
        // Truncated output
        assert_eq!(base_w(&input, 3), vec![0xA, 0xB, 0xC]);
    }

    #[test]
    fn test_checksum_bounds() {
        // All-zero digest gives the largest checksum
        let zeros = vec![0u32; WOTS_LEN1];
        assert_eq!(compute_checksum(&zeros), 15 * 64);

        let max = vec![W - 1; WOTS_LEN1];
        assert_eq!(compute_checksum(&max), 0);
    }

    #[test]
    fn test_checksum_digits() {
        // 960 = 0x3C0, shifted by 4 -> 0x3C00 -> digits 3, C, 0
        assert_eq!(checksum_to_base_w(960), vec![0x3, 0xC, 0x0]);
        assert_eq!(checksum_to_base_w(0), vec![0, 0, 0]);
    }

    #[test]
    fn test_chain_lengths_layout() {
        let digest = [0u8; N];
        let lengths = chain_lengths(&digest);
        assert!(lengths[..WOTS_LEN1].iter().all(|&l| l == 0));
        assert_eq!(&lengths[WOTS_LEN1..], &[0x3, 0xC, 0x0]);
    }

    #[test]
    fn test_chain_additivity() {
        let pub_seed = [0u8; N];
        let x = [1u8; N];
        let mut adrs = HashAddress::new(AddressType::Ots);

        let whole = chain(HASH, &x, 0, 5, &pub_seed, &mut adrs);
        let part = chain(HASH, &x, 0, 3, &pub_seed, &mut adrs);
        let rest = chain(HASH, &part, 3, 2, &pub_seed, &mut adrs);
        assert_eq!(whole, rest);

        // Zero steps is the identity
        assert_eq!(chain(HASH, &x, 4, 0, &pub_seed, &mut adrs), x);
    }

    #[test]
    fn test_chain_stops_at_end() {
        let pub_seed = [0u8; N];
        let x = [9u8; N];
        let mut adrs = HashAddress::new(AddressType::Ots);

        let full = chain(HASH, &x, 0, W - 1, &pub_seed, &mut adrs);
        let overshoot = chain(HASH, &x, 0, W + 10, &pub_seed, &mut adrs);
        assert_eq!(full, overshoot);

        // Continuing from the last position is a no-op
        let mid = chain(HASH, &x, 0, 7, &pub_seed, &mut adrs);
        assert_eq!(chain(HASH, &mid, 7, W, &pub_seed, &mut adrs), full);
        assert_eq!(chain(HASH, &full, W - 1, 1, &pub_seed, &mut adrs), full);
    }

    #[test]
    fn test_l_tree_single_node() {
        let node = [5u8; N];
        let mut adrs = HashAddress::new(AddressType::LTree);
        assert_eq!(l_tree(HASH, vec![node], &[0u8; N], &mut adrs), node);
    }

    #[test]
    fn test_leaf_deterministic() {
        let sk_seed = [1u8; N];
        let pub_seed = [2u8; N];

        let leaf1 = derive_leaf(HASH, &sk_seed, &pub_seed, 3);
        let leaf2 = derive_leaf(HASH, &sk_seed, &pub_seed, 3);
        assert_eq!(leaf1, leaf2);

        let other = derive_leaf(HASH, &sk_seed, &pub_seed, 4);
        assert_ne!(leaf1, other);
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let sk_seed = [1u8; N];
        let pub_seed = [2u8; N];
        let digest = [3u8; N];

        for hash_fn in [
            HashFunction::Sha2_256,
            HashFunction::Shake128,
            HashFunction::Shake256,
        ] {
            let leaf = derive_leaf(hash_fn, &sk_seed, &pub_seed, 7);
            let sig = sign_leaf(hash_fn, &sk_seed, &pub_seed, 7, &digest);
            assert_eq!(sig.len(), WOTS_LEN);
            assert!(verify_leaf(hash_fn, &digest, &sig, &pub_seed, 7, &leaf));
        }
    }

    #[test]
    fn test_verify_rejects_wrong_digest_and_index() {
        let sk_seed = [1u8; N];
        let pub_seed = [2u8; N];
        let digest = [3u8; N];
        let mut wrong = digest;
        wrong[0] ^= 0x10;

        let leaf = derive_leaf(HASH, &sk_seed, &pub_seed, 0);
        let sig = sign_leaf(HASH, &sk_seed, &pub_seed, 0, &digest);

        assert!(!verify_leaf(HASH, &wrong, &sig, &pub_seed, 0, &leaf));
        assert!(!verify_leaf(HASH, &digest, &sig, &pub_seed, 1, &leaf));
        assert!(!verify_leaf(HASH, &digest, &sig[1..], &pub_seed, 0, &leaf));
    }
}
