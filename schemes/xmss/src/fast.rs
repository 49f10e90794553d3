//! XMSS signer with BDS traversal.
//!
//! The authentication path of the next leaf is kept up to date between
//! signatures, so signing costs a bounded number of leaf computations
//! instead of a full treehash. The traversal state only moves forward:
//! [`XmssFast::set_index`] can skip leaves but never revisit them.

use crate::bds::BdsState;
use crate::descriptor::{AddrFormat, Descriptor};
use crate::error::{Result, XmssError};
use crate::hash::HashFunction;
use crate::sign::Signature;
use crate::signer::{XmssBase, XmssSigner};
use tracing::debug;

/// XMSS signer with cached traversal state.
pub struct XmssFast {
    base: XmssBase,
    bds: BdsState,
}

impl XmssFast {
    /// Builds the tree for a 48-byte seed and positions it at leaf 0.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an unsupported height or a seed that is not
    /// 48 bytes.
    pub fn new(
        seed: &[u8],
        height: u8,
        hash_function: HashFunction,
        addr_format: AddrFormat,
    ) -> Result<Self> {
        let descriptor = Descriptor::new(hash_function, height, addr_format)?;
        Self::with_descriptor(seed, descriptor)
    }

    /// Rebuilds a signer from a 51-byte extended seed.
    pub fn from_extended_seed(extended_seed: &[u8]) -> Result<Self> {
        let (descriptor, seed) = XmssBase::split_extended_seed(extended_seed)?;
        Self::with_descriptor(seed, descriptor)
    }

    fn with_descriptor(seed: &[u8], descriptor: Descriptor) -> Result<Self> {
        let hash_fn = descriptor.hash_function();
        let params = descriptor.params();
        let (base, bds) = XmssBase::with_root(seed, descriptor, |sk| {
            BdsState::setup(hash_fn, &sk.sk_seed, &sk.pub_seed, params)
        })?;
        debug!(
            height = params.height(),
            hash_function = ?hash_fn,
            "xmss fast signer ready"
        );
        Ok(XmssFast { base, bds })
    }

    /// Moves the signer forward to `new_index`, skipping the leaves in
    /// between.
    ///
    /// Setting the current index is a no-op.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if `new_index` is not a leaf of the tree
    /// - `IndexRewind` if `new_index` is below the current index
    pub fn set_index(&mut self, new_index: u32) -> Result<()> {
        let capacity = self.base.number_signatures();
        if u64::from(new_index) >= capacity {
            return Err(XmssError::IndexOutOfRange {
                index: u64::from(new_index),
                capacity,
            });
        }

        let current = self.base.index();
        if new_index < current {
            return Err(XmssError::IndexRewind {
                current,
                requested: new_index,
            });
        }
        if new_index == current {
            return Ok(());
        }

        let hash_fn = self.base.hash_function();
        let sk = self.base.sk();
        for leaf in current..new_index {
            self.bds.advance(hash_fn, &sk.sk_seed, &sk.pub_seed, leaf);
        }
        self.base.set_index_unchecked(new_index);
        debug!(from = current, to = new_index, "xmss index repositioned");
        Ok(())
    }
}

impl XmssSigner for XmssFast {
    fn base(&self) -> &XmssBase {
        &self.base
    }

    fn sign_typed(&mut self, message: &[u8]) -> Result<Signature> {
        let auth = self.bds.auth_path().to_vec();
        let sig = self.base.sign_and_advance(message, auth)?;

        // The last leaf has no successor to prepare
        if u64::from(sig.index) + 1 < self.base.number_signatures() {
            let sk = self.base.sk();
            self.bds
                .advance(self.base.hash_function(), &sk.sk_seed, &sk.pub_seed, sig.index);
        }
        Ok(sig)
    }
}
