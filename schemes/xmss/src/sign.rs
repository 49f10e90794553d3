//! Signature generation for XMSS.
//!
//! # Signature Structure
//!
//! - idx: leaf index, big-endian u32 (4 bytes)
//! - R: randomizer, PRF(SK.prf, toByte(idx, 32)) (n bytes)
//! - SIG_WOTS: one-time signature on the message digest (len · n bytes)
//! - AUTH: authentication path of leaf idx (H · n bytes)

use crate::error::{Result, XmssError};
use crate::hash::{h_msg, prf, to_byte32, HashFunction};
use crate::keygen::SecretKey;
use crate::params::{XmssParams, N, WOTS_LEN};
use crate::wots::sign_leaf;

/// XMSS signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// Leaf used for this signature
    pub index: u32,
    /// Message randomizer
    pub r: [u8; N],
    /// WOTS+ signature (67 elements)
    pub wots_sig: Vec<[u8; N]>,
    /// Authentication path, leaf to root
    pub auth: Vec<[u8; N]>,
}

impl Signature {
    /// Serializes the signature.
    ///
    /// Format: idx || R || SIG_WOTS || AUTH
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + N * (1 + self.wots_sig.len() + self.auth.len()));
        bytes.extend_from_slice(&self.index.to_be_bytes());
        bytes.extend_from_slice(&self.r);
        for node in self.wots_sig.iter().chain(self.auth.iter()) {
            bytes.extend_from_slice(node);
        }
        bytes
    }

    /// Parses a signature for a tree with the given parameters.
    pub fn from_bytes(bytes: &[u8], params: XmssParams) -> Result<Self> {
        let expected = params.signature_size();
        if bytes.len() != expected {
            return Err(XmssError::MalformedInput {
                field: "signature",
                expected,
                actual: bytes.len(),
            });
        }

        let mut index = [0u8; 4];
        index.copy_from_slice(&bytes[..4]);
        let mut r = [0u8; N];
        r.copy_from_slice(&bytes[4..4 + N]);

        let mut nodes = bytes[4 + N..].chunks_exact(N).map(|chunk| {
            let mut node = [0u8; N];
            node.copy_from_slice(chunk);
            node
        });
        let wots_sig: Vec<[u8; N]> = nodes.by_ref().take(WOTS_LEN).collect();
        let auth: Vec<[u8; N]> = nodes.collect();

        Ok(Signature {
            index: u32::from_be_bytes(index),
            r,
            wots_sig,
            auth,
        })
    }
}

/// Per-signature randomizer R = PRF(SK.prf, toByte(idx, 32)).
pub fn randomizer(hash_fn: HashFunction, sk_prf: &[u8; N], index: u32) -> [u8; N] {
    prf(hash_fn, sk_prf, &to_byte32(u64::from(index)))
}

/// Randomized message digest H_msg(R || root || toByte(idx, 32), M).
pub fn message_digest(
    hash_fn: HashFunction,
    r: &[u8; N],
    root: &[u8; N],
    index: u32,
    message: &[u8],
) -> [u8; N] {
    let mut key = [0u8; 3 * N];
    key[..N].copy_from_slice(r);
    key[N..2 * N].copy_from_slice(root);
    key[2 * N..].copy_from_slice(&to_byte32(u64::from(index)));
    h_msg(hash_fn, &key, message)
}

/// Signs `message` with the leaf at `sk.index`, attaching `auth`.
///
/// Does not touch the index; the caller owns leaf accounting.
pub(crate) fn sign_at_index(
    hash_fn: HashFunction,
    sk: &SecretKey,
    message: &[u8],
    auth: Vec<[u8; N]>,
) -> Signature {
    let index = sk.index;
    let r = randomizer(hash_fn, &sk.sk_prf, index);
    let digest = message_digest(hash_fn, &r, &sk.root, index, message);
    let wots_sig = sign_leaf(hash_fn, &sk.sk_seed, &sk.pub_seed, index, &digest);

    Signature {
        index,
        r,
        wots_sig,
        auth,
    }
}
