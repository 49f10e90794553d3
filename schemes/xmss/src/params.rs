//! XMSS parameters as deployed on the QRL ledger.
//!
//! Hash output length, Winternitz parameter and BDS traversal depth are
//! fixed. Only the tree height varies, and it must satisfy the traversal
//! constraints:
//!
//! - H > K (with K = 2)
//! - H - K is even
//! - H / 2 fits the 4-bit height field of the descriptor
//!
//! which leaves the even heights 4 through 30.
//!
//! # Sizes
//!
//! | Item | Bytes |
//! |------|-------|
//! | Seed | 48 |
//! | Extended seed | 51 |
//! | Extended public key | 67 |
//! | Secret key | 132 |
//! | Address | 39 |
//! | Signature | 2180 + 32·H |

use crate::error::{Result, XmssError};

/// Hash output size in bytes.
pub const N: usize = 32;

/// Winternitz parameter.
pub const W: u32 = 16;

/// Log base 2 of W.
pub const LOG_W: u32 = 4;

/// Number of base-w digits covering the message digest.
pub const WOTS_LEN1: usize = 64;

/// Number of base-w checksum digits.
pub const WOTS_LEN2: usize = 3;

/// Total number of WOTS+ hash chains.
pub const WOTS_LEN: usize = WOTS_LEN1 + WOTS_LEN2;

/// Size of a WOTS+ signature (or unpacked public key) in bytes.
pub const WOTS_SIG_SIZE: usize = WOTS_LEN * N;

/// BDS traversal parameter: the top K levels are retained.
pub const BDS_K: u32 = 2;

/// Smallest supported tree height.
pub const MIN_HEIGHT: u8 = 4;

/// Largest supported tree height.
pub const MAX_HEIGHT: u8 = 30;

/// Seed size in bytes.
pub const SEED_SIZE: usize = 48;

/// Descriptor size in bytes.
pub const DESCRIPTOR_SIZE: usize = 3;

/// Extended seed size: descriptor followed by the seed.
pub const EXTENDED_SEED_SIZE: usize = DESCRIPTOR_SIZE + SEED_SIZE;

/// Public key size without descriptor: root and public seed.
pub const PUBLIC_KEY_SIZE: usize = 2 * N;

/// Extended public key size: descriptor, root and public seed.
pub const EXTENDED_PUBLIC_KEY_SIZE: usize = DESCRIPTOR_SIZE + PUBLIC_KEY_SIZE;

/// Secret key size: index, sk_seed, sk_prf, pub_seed and root.
pub const SECRET_KEY_SIZE: usize = 4 + 4 * N;

/// Address size for the SHA256_2X format.
pub const ADDRESS_SIZE: usize = DESCRIPTOR_SIZE + N + 4;

/// Fixed part of a signature: index, randomizer and WOTS+ signature.
pub const SIGNATURE_BASE_SIZE: usize = 4 + N + WOTS_SIG_SIZE;

/// Validated parameters for one XMSS tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct XmssParams {
    height: u8,
}

impl XmssParams {
    /// Validates a tree height.
    pub fn new(height: u8) -> Result<Self> {
        if height < MIN_HEIGHT || height > MAX_HEIGHT {
            return Err(XmssError::InvalidParameter {
                field: "height",
                reason: "height must be between 4 and 30",
            });
        }
        if (u32::from(height) - BDS_K) % 2 != 0 {
            return Err(XmssError::InvalidParameter {
                field: "height",
                reason: "height minus the traversal parameter must be even",
            });
        }
        Ok(XmssParams { height })
    }

    /// Tree height H.
    #[inline]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Number of leaves (one-time keys), 2^H.
    #[inline]
    pub const fn leaf_count(&self) -> u64 {
        1u64 << self.height
    }

    /// Signature size in bytes.
    ///
    /// idx (4) + R (n) + WOTS+ signature (len·n) + auth path (H·n)
    pub const fn signature_size(&self) -> usize {
        SIGNATURE_BASE_SIZE + self.height as usize * N
    }

    /// Number of treehash instances kept by the fast signer (H - K).
    pub const fn treehash_count(&self) -> usize {
        self.height as usize - BDS_K as usize
    }

    /// Number of retained right nodes on the top K levels.
    pub const fn retain_count(&self) -> usize {
        (1 << BDS_K) - BDS_K as usize - 1
    }

    /// Treehash steps granted per signature.
    pub const fn updates_per_round(&self) -> usize {
        self.treehash_count() >> 1
    }

    /// Recovers the parameters from a signature length.
    pub fn from_signature_size(size: usize) -> Result<Self> {
        if size < SIGNATURE_BASE_SIZE || (size - SIGNATURE_BASE_SIZE) % N != 0 {
            return Err(XmssError::InvalidParameter {
                field: "signature size",
                reason: "does not correspond to any tree height",
            });
        }
        let height = (size - SIGNATURE_BASE_SIZE) / N;
        let height = u8::try_from(height).map_err(|_| XmssError::InvalidParameter {
            field: "signature size",
            reason: "does not correspond to any tree height",
        })?;
        Self::new(height)
    }
}

/// Tree height implied by a signature length.
pub fn height_from_signature_size(size: usize) -> Result<u8> {
    XmssParams::from_signature_size(size).map(|p| p.height())
}
