//! Hash suite for XMSS: three interchangeable hash families and the keyed
//! hash functions built on them.
//!
//! The family is chosen once, from the descriptor's hash-function tag, and
//! threaded through every call as a [`HashFunction`] value.
//!
//! # Functions
//!
//! - `PRF`: keyed pseudorandom function (seed expansion, randomizer R)
//! - `H_msg`: randomized message hash
//! - `F`: keyed, masked hash of one n-byte input (chain steps)
//! - `H`: keyed, masked hash of two n-byte inputs (tree nodes, L-trees)
//!
//! All four are instances of
//! `core_hash(type, key, in) = Hash(toByte(type, 32) || key || in)`.

use crate::adrs::HashAddress;
use crate::error::{Result, XmssError};
use crate::params::N;
use sha2::{Digest, Sha256};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128, Shake256,
};

const TYPE_F: u64 = 0;
const TYPE_H: u64 = 1;
const TYPE_H_MSG: u64 = 2;
const TYPE_PRF: u64 = 3;

/// Underlying hash family, as tagged in the descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HashFunction {
    /// SHA2-256
    Sha2_256 = 0,
    /// SHAKE128 truncated to 32 bytes
    Shake128 = 1,
    /// SHAKE256 truncated to 32 bytes
    Shake256 = 2,
}

impl TryFrom<u8> for HashFunction {
    type Error = XmssError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(HashFunction::Sha2_256),
            1 => Ok(HashFunction::Shake128),
            2 => Ok(HashFunction::Shake256),
            _ => Err(XmssError::UnsupportedAlgorithm {
                field: "hash function",
                tag,
            }),
        }
    }
}

impl HashFunction {
    /// Descriptor tag of this family.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Hashes `input` to a 32-byte digest.
    pub fn hash(self, input: &[u8]) -> [u8; N] {
        self.hash_parts(&[input])
    }

    /// Variable-length output. Only the SHAKE families are extendable.
    pub fn xof(self, input: &[u8], out_len: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; out_len];
        match self {
            HashFunction::Sha2_256 => {
                return Err(XmssError::UnsupportedAlgorithm {
                    field: "extendable output",
                    tag: self.tag(),
                })
            }
            HashFunction::Shake128 => {
                let mut hasher = Shake128::default();
                hasher.update(input);
                hasher.finalize_xof().read(&mut output);
            }
            HashFunction::Shake256 => {
                let mut hasher = Shake256::default();
                hasher.update(input);
                hasher.finalize_xof().read(&mut output);
            }
        }
        Ok(output)
    }

    /// Hashes the concatenation of `parts` without materializing it.
    fn hash_parts(self, parts: &[&[u8]]) -> [u8; N] {
        let mut output = [0u8; N];
        match self {
            HashFunction::Sha2_256 => {
                let mut hasher = Sha256::new();
                for part in parts {
                    Digest::update(&mut hasher, part);
                }
                output.copy_from_slice(&hasher.finalize());
            }
            HashFunction::Shake128 => {
                let mut hasher = Shake128::default();
                for part in parts {
                    hasher.update(part);
                }
                hasher.finalize_xof().read(&mut output);
            }
            HashFunction::Shake256 => {
                let mut hasher = Shake256::default();
                for part in parts {
                    hasher.update(part);
                }
                hasher.finalize_xof().read(&mut output);
            }
        }
        output
    }
}

/// Big-endian encoding of `value` into 32 bytes.
#[inline]
pub fn to_byte32(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

fn core_hash(hash_fn: HashFunction, hash_type: u64, key: &[u8], input: &[u8]) -> [u8; N] {
    hash_fn.hash_parts(&[&to_byte32(hash_type)[..], key, input])
}

/// PRF function.
///
/// PRF(KEY, M) = core_hash(3, KEY, M) with a 32-byte input.
pub fn prf(hash_fn: HashFunction, key: &[u8; N], input: &[u8; 32]) -> [u8; N] {
    core_hash(hash_fn, TYPE_PRF, key, input)
}

/// H_msg function: randomized hash of an arbitrary-length message.
///
/// The 3n-byte key is R || root || toByte(idx, n).
pub fn h_msg(hash_fn: HashFunction, key: &[u8; 3 * N], message: &[u8]) -> [u8; N] {
    core_hash(hash_fn, TYPE_H_MSG, key, message)
}

/// Tweakable hash F for chain steps.
///
/// Derives a key and a bitmask from `pub_seed` and `adrs`, then hashes the
/// masked input. Leaves the key-and-mask word of `adrs` at 1.
pub fn hash_f(
    hash_fn: HashFunction,
    input: &[u8; N],
    pub_seed: &[u8; N],
    adrs: &mut HashAddress,
) -> [u8; N] {
    adrs.set_key_and_mask(0);
    let key = prf(hash_fn, pub_seed, &adrs.to_bytes());
    adrs.set_key_and_mask(1);
    let bitmask = prf(hash_fn, pub_seed, &adrs.to_bytes());

    let mut masked = [0u8; N];
    for ((m, x), b) in masked.iter_mut().zip(input).zip(&bitmask) {
        *m = x ^ b;
    }
    core_hash(hash_fn, TYPE_F, &key, &masked)
}

/// Tweakable hash H for two children.
///
/// Leaves the key-and-mask word of `adrs` at 2.
pub fn hash_h(
    hash_fn: HashFunction,
    left: &[u8; N],
    right: &[u8; N],
    pub_seed: &[u8; N],
    adrs: &mut HashAddress,
) -> [u8; N] {
    adrs.set_key_and_mask(0);
    let key = prf(hash_fn, pub_seed, &adrs.to_bytes());
    adrs.set_key_and_mask(1);
    let bitmask_left = prf(hash_fn, pub_seed, &adrs.to_bytes());
    adrs.set_key_and_mask(2);
    let bitmask_right = prf(hash_fn, pub_seed, &adrs.to_bytes());

    let mut masked = [0u8; 2 * N];
    for (i, m) in masked.iter_mut().enumerate() {
        *m = if i < N {
            left[i] ^ bitmask_left[i]
        } else {
            right[i - N] ^ bitmask_right[i - N]
        };
    }
    core_hash(hash_fn, TYPE_H, &key, &masked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adrs::AddressType;

    const ALL: [HashFunction; 3] = [
        HashFunction::Sha2_256,
        HashFunction::Shake128,
        HashFunction::Shake256,
    ];

    #[test]
    fn test_known_digests() {
        let input = b"This is a test X";
        assert_eq!(
            hex::encode(HashFunction::Sha2_256.hash(input)),
            "a11609b2cc5f26619fcc865473246c9ac59861383a3c4edd2433230258afa03b"
        );
        assert_eq!(
            hex::encode(HashFunction::Shake128.hash(input)),
            "02c7654fd239753b787067b1b75523d9bd2c39daa384e4b0d4f91eb78d2a5492"
        );
        assert_eq!(
            hex::encode(HashFunction::Shake256.hash(input)),
            "b3453cb0cbd37d726a842eb750e6091b15a92efd2695e3191a96d8d07413db04"
        );
    }

    #[test]
    fn test_tag_roundtrip() {
        for hash_fn in ALL {
            assert_eq!(HashFunction::try_from(hash_fn.tag()).unwrap(), hash_fn);
        }
        assert_eq!(
            HashFunction::try_from(3),
            Err(XmssError::UnsupportedAlgorithm {
                field: "hash function",
                tag: 3
            })
        );
    }

    #[test]
    fn test_xof_prefix_matches_hash() {
        let input = b"xof prefix";
        for hash_fn in [HashFunction::Shake128, HashFunction::Shake256] {
            let long = hash_fn.xof(input, 100).unwrap();
            assert_eq!(long.len(), 100);
            assert_eq!(&long[..N], &hash_fn.hash(input));
        }
        assert!(HashFunction::Sha2_256.xof(input, 32).is_err());
    }

    #[test]
    fn test_hash_parts_equals_concatenation() {
        for hash_fn in ALL {
            let joined = hash_fn.hash(b"abcdef");
            let parts = hash_fn.hash_parts(&[&b"ab"[..], &b""[..], &b"cdef"[..]]);
            assert_eq!(joined, parts);
        }
    }

    #[test]
    fn test_to_byte32() {
        let bytes = to_byte32(0x0102);
        assert_eq!(&bytes[..30], &[0u8; 30]);
        assert_eq!(&bytes[30..], &[0x01, 0x02]);
    }

    #[test]
    fn test_hash_f_domain_separation() {
        let pub_seed = [7u8; N];
        let input = [1u8; N];

        let mut adrs1 = HashAddress::new(AddressType::Ots);
        adrs1.set_chain(0);
        let mut adrs2 = HashAddress::new(AddressType::Ots);
        adrs2.set_chain(1);

        for hash_fn in ALL {
            let out1 = hash_f(hash_fn, &input, &pub_seed, &mut adrs1);
            let out2 = hash_f(hash_fn, &input, &pub_seed, &mut adrs2);
            assert_ne!(out1, out2);
            // Deterministic for identical inputs
            assert_eq!(out1, hash_f(hash_fn, &input, &pub_seed, &mut adrs1));
        }
    }

    #[test]
    fn test_hash_h_order_matters() {
        let pub_seed = [3u8; N];
        let a = [1u8; N];
        let b = [2u8; N];
        let mut adrs = HashAddress::new(AddressType::HashTree);

        for hash_fn in ALL {
            let ab = hash_h(hash_fn, &a, &b, &pub_seed, &mut adrs);
            let ba = hash_h(hash_fn, &b, &a, &pub_seed, &mut adrs);
            assert_ne!(ab, ba);
        }
    }
}
