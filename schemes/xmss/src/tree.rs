//! Merkle tree over WOTS+ leaves.
//!
//! The tree of height H has 2^H leaves; the node at height z and position
//! i is `H(node(z-1, 2i) || node(z-1, 2i+1))`, hashed with tree height
//! z - 1 and tree index i in the address. The root is the long-term public
//! key.
//!
//! Authentication paths are ordered leaf to root: entry j is the sibling of
//! the path node at height j.

use crate::adrs::{AddressType, HashAddress};
use crate::hash::{hash_h, HashFunction};
use crate::params::N;
use crate::wots::derive_leaf;

/// Hashes two children into their parent at (`height` + 1, `index`).
#[inline]
pub(crate) fn hash_children(
    hash_fn: HashFunction,
    left: &[u8; N],
    right: &[u8; N],
    pub_seed: &[u8; N],
    height: u32,
    index: u32,
) -> [u8; N] {
    let mut adrs = HashAddress::new(AddressType::HashTree);
    adrs.set_tree_height(height);
    adrs.set_tree_index(index);
    hash_h(hash_fn, left, right, pub_seed, &mut adrs)
}

/// Computes the node at `height` and position `index`.
///
/// Costs 2^height leaf derivations.
pub fn tree_node(
    hash_fn: HashFunction,
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    index: u32,
    height: u32,
) -> [u8; N] {
    if height == 0 {
        return derive_leaf(hash_fn, sk_seed, pub_seed, index);
    }

    let left = tree_node(hash_fn, sk_seed, pub_seed, 2 * index, height - 1);
    let right = tree_node(hash_fn, sk_seed, pub_seed, 2 * index + 1, height - 1);

    hash_children(hash_fn, &left, &right, pub_seed, height - 1, index)
}

/// Computes the root of a tree of the given height.
pub fn build_root(
    hash_fn: HashFunction,
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    height: u32,
) -> [u8; N] {
    tree_node(hash_fn, sk_seed, pub_seed, 0, height)
}

/// Computes the authentication path of `leaf_index`.
///
/// Every sibling subtree is built once, so the cost is 2^height - 1 leaf
/// derivations. Height 0 yields an empty path.
pub fn auth_path(
    hash_fn: HashFunction,
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    height: u32,
    leaf_index: u32,
) -> Vec<[u8; N]> {
    (0..height)
        .map(|j| tree_node(hash_fn, sk_seed, pub_seed, (leaf_index >> j) ^ 1, j))
        .collect()
}

/// Climbs from a leaf to the root along an authentication path.
///
/// The parity of the current node position decides whether the sibling
/// goes on the left or on the right.
pub fn root_from_auth_path(
    hash_fn: HashFunction,
    leaf: &[u8; N],
    leaf_index: u32,
    auth: &[[u8; N]],
    pub_seed: &[u8; N],
) -> [u8; N] {
    let mut node = *leaf;
    let mut index = leaf_index;

    for (height, sibling) in auth.iter().enumerate() {
        let parent = index >> 1;
        node = if index & 1 == 1 {
            hash_children(hash_fn, sibling, &node, pub_seed, height as u32, parent)
        } else {
            hash_children(hash_fn, &node, sibling, pub_seed, height as u32, parent)
        };
        index = parent;
    }
    node
}

/// Checks that `leaf` at `leaf_index` hashes up to `root`.
pub fn verify_path(
    hash_fn: HashFunction,
    leaf: &[u8; N],
    leaf_index: u32,
    auth: &[[u8; N]],
    root: &[u8; N],
    pub_seed: &[u8; N],
) -> bool {
    if auth.len() < 32 && u64::from(leaf_index) >> auth.len() != 0 {
        return false;
    }
    root_from_auth_path(hash_fn, leaf, leaf_index, auth, pub_seed) == *root
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: HashFunction = HashFunction::Sha2_256;
    const SK_SEED: [u8; N] = [0x11; N];
    const PUB_SEED: [u8; N] = [0x22; N];

    #[test]
    fn test_height_zero_tree() {
        let leaf = derive_leaf(HASH, &SK_SEED, &PUB_SEED, 0);
        let root = build_root(HASH, &SK_SEED, &PUB_SEED, 0);
        assert_eq!(root, leaf);

        let path = auth_path(HASH, &SK_SEED, &PUB_SEED, 0, 0);
        assert!(path.is_empty());
        assert!(verify_path(HASH, &leaf, 0, &path, &root, &PUB_SEED));
    }

    #[test]
    fn test_every_leaf_reaches_root() {
        let height = 3;
        let root = build_root(HASH, &SK_SEED, &PUB_SEED, height);

        for idx in 0..(1u32 << height) {
            let leaf = derive_leaf(HASH, &SK_SEED, &PUB_SEED, idx);
            let path = auth_path(HASH, &SK_SEED, &PUB_SEED, height, idx);
            assert_eq!(path.len(), height as usize);
            assert!(verify_path(HASH, &leaf, idx, &path, &root, &PUB_SEED), "leaf {}", idx);
        }
    }

    #[test]
    fn test_wrong_index_rejected() {
        let height = 2;
        let root = build_root(HASH, &SK_SEED, &PUB_SEED, height);
        let leaf = derive_leaf(HASH, &SK_SEED, &PUB_SEED, 1);
        let path = auth_path(HASH, &SK_SEED, &PUB_SEED, height, 1);

        assert!(!verify_path(HASH, &leaf, 0, &path, &root, &PUB_SEED));
        // Index beyond the tree
        assert!(!verify_path(HASH, &leaf, 5, &path, &root, &PUB_SEED));
    }

    #[test]
    fn test_tampered_path_rejected() {
        let height = 2;
        let root = build_root(HASH, &SK_SEED, &PUB_SEED, height);
        let leaf = derive_leaf(HASH, &SK_SEED, &PUB_SEED, 2);
        let mut path = auth_path(HASH, &SK_SEED, &PUB_SEED, height, 2);

        path[1][0] ^= 1;
        assert!(!verify_path(HASH, &leaf, 2, &path, &root, &PUB_SEED));
    }

    #[test]
    fn test_node_composition() {
        // The root is the hash of the two height-1 nodes
        let left = tree_node(HASH, &SK_SEED, &PUB_SEED, 0, 1);
        let right = tree_node(HASH, &SK_SEED, &PUB_SEED, 1, 1);
        let root = build_root(HASH, &SK_SEED, &PUB_SEED, 2);
        assert_eq!(hash_children(HASH, &left, &right, &PUB_SEED, 1, 0), root);
    }
}
