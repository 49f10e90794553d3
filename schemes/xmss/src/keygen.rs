//! Key material for XMSS.
//!
//! # Key Structure
//!
//! - **Seed** (48 bytes): the only secret input. `SHAKE256(seed)` expands
//!   to SK.seed || SK.prf || PK.seed, whatever the tree's hash family.
//!
//! - **Public Key**: descriptor || root || PK.seed (67 bytes)
//!
//! - **Secret Key**: idx || SK.seed || SK.prf || PK.seed || root (132 bytes)
//!   - idx: next unused leaf, big-endian u32

use crate::descriptor::Descriptor;
use crate::error::{Result, XmssError};
use crate::hashing::shake256;
use crate::params::{
    DESCRIPTOR_SIZE, EXTENDED_PUBLIC_KEY_SIZE, N, SECRET_KEY_SIZE, SEED_SIZE,
};
use std::fmt;
use zeroize::Zeroize;

/// Splits a 48-byte seed into (SK.seed, SK.prf, PK.seed).
pub fn expand_seed(seed: &[u8]) -> Result<([u8; N], [u8; N], [u8; N])> {
    if seed.len() != SEED_SIZE {
        return Err(XmssError::InvalidParameter {
            field: "seed",
            reason: "seed must be 48 bytes",
        });
    }

    let mut material = shake256(3 * N, seed);
    let mut sk_seed = [0u8; N];
    let mut sk_prf = [0u8; N];
    let mut pub_seed = [0u8; N];
    sk_seed.copy_from_slice(&material[..N]);
    sk_prf.copy_from_slice(&material[N..2 * N]);
    pub_seed.copy_from_slice(&material[2 * N..]);
    material.zeroize();

    Ok((sk_seed, sk_prf, pub_seed))
}

/// XMSS public key, qualified by its descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// Tree parameters and hash family
    pub descriptor: Descriptor,
    /// Merkle root
    pub root: [u8; N],
    /// Public seed for the keyed hashes
    pub pub_seed: [u8; N],
}

impl PublicKey {
    /// Serializes to descriptor || root || PK.seed.
    pub fn to_bytes(&self) -> [u8; EXTENDED_PUBLIC_KEY_SIZE] {
        let mut bytes = [0u8; EXTENDED_PUBLIC_KEY_SIZE];
        bytes[..DESCRIPTOR_SIZE].copy_from_slice(&self.descriptor.to_bytes());
        bytes[DESCRIPTOR_SIZE..DESCRIPTOR_SIZE + N].copy_from_slice(&self.root);
        bytes[DESCRIPTOR_SIZE + N..].copy_from_slice(&self.pub_seed);
        bytes
    }

    /// Parses a 67-byte extended public key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let descriptor = Descriptor::from_extended_pk(bytes)?;
        let mut root = [0u8; N];
        let mut pub_seed = [0u8; N];
        root.copy_from_slice(&bytes[DESCRIPTOR_SIZE..DESCRIPTOR_SIZE + N]);
        pub_seed.copy_from_slice(&bytes[DESCRIPTOR_SIZE + N..]);

        Ok(PublicKey {
            descriptor,
            root,
            pub_seed,
        })
    }
}

/// XMSS secret key.
///
/// # Security
///
/// Zeroized on drop. `Debug` only shows the index.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    /// Next unused leaf
    pub index: u32,
    /// Seed for the one-time keys
    pub sk_seed: [u8; N],
    /// Key for the per-signature randomizer
    pub sk_prf: [u8; N],
    /// Public seed (copy)
    pub pub_seed: [u8; N],
    /// Merkle root (copy)
    pub root: [u8; N],
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.sk_seed.zeroize();
        self.sk_prf.zeroize();
        self.pub_seed.zeroize();
        self.root.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl SecretKey {
    /// Serializes to idx || SK.seed || SK.prf || PK.seed || root.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        let mut bytes = [0u8; SECRET_KEY_SIZE];
        bytes[..4].copy_from_slice(&self.index.to_be_bytes());
        for (chunk, part) in bytes[4..]
            .chunks_exact_mut(N)
            .zip([&self.sk_seed, &self.sk_prf, &self.pub_seed, &self.root])
        {
            chunk.copy_from_slice(part);
        }
        bytes
    }

    /// Parses a 132-byte secret key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(XmssError::MalformedInput {
                field: "secret key",
                expected: SECRET_KEY_SIZE,
                actual: bytes.len(),
            });
        }

        let mut index = [0u8; 4];
        index.copy_from_slice(&bytes[..4]);
        let mut sk = SecretKey {
            index: u32::from_be_bytes(index),
            sk_seed: [0u8; N],
            sk_prf: [0u8; N],
            pub_seed: [0u8; N],
            root: [0u8; N],
        };
        sk.sk_seed.copy_from_slice(&bytes[4..4 + N]);
        sk.sk_prf.copy_from_slice(&bytes[4 + N..4 + 2 * N]);
        sk.pub_seed.copy_from_slice(&bytes[4 + 2 * N..4 + 3 * N]);
        sk.root.copy_from_slice(&bytes[4 + 3 * N..]);
        Ok(sk)
    }

    /// Public key for the given descriptor.
    pub fn public_key(&self, descriptor: Descriptor) -> PublicKey {
        PublicKey {
            descriptor,
            root: self.root,
            pub_seed: self.pub_seed,
        }
    }
}
