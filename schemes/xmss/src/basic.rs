//! XMSS signer that recomputes the authentication path for every signature.
//!
//! Keeps no traversal state, so each signature costs a full treehash of
//! 2^H - 1 leaves. Suited to small trees and to callers that sign rarely.

use crate::descriptor::{AddrFormat, Descriptor};
use crate::error::Result;
use crate::hash::HashFunction;
use crate::sign::Signature;
use crate::signer::{XmssBase, XmssSigner};
use crate::tree::{auth_path, build_root};
use tracing::debug;

/// Stateless-traversal XMSS signer.
pub struct XmssBasic {
    base: XmssBase,
}

impl XmssBasic {
    /// Builds the tree for a 48-byte seed.
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
        let height = u32::from(descriptor.height());
        let (base, ()) = XmssBase::with_root(seed, descriptor, |sk| {
            ((), build_root(hash_fn, &sk.sk_seed, &sk.pub_seed, height))
        })?;
        debug!(height, hash_function = ?hash_fn, "xmss basic signer ready");
        Ok(XmssBasic { base })
    }
}

impl XmssSigner for XmssBasic {
    fn base(&self) -> &XmssBase {
        &self.base
    }

    fn sign_typed(&mut self, message: &[u8]) -> Result<Signature> {
        self.base.check_not_exhausted()?;
        let sk = self.base.sk();
        let auth = auth_path(
            self.base.hash_function(),
            &sk.sk_seed,
            &sk.pub_seed,
            u32::from(self.base.height()),
            sk.index,
        );
        self.base.sign_and_advance(message, auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XmssError;
    use crate::params::SEED_SIZE;
    use crate::verify::verify;

    #[test]
    fn test_sign_all_leaves() {
        let mut xmss =
            XmssBasic::new(&[3u8; SEED_SIZE], 4, HashFunction::Sha2_256, AddrFormat::Sha256_2x)
                .unwrap();
        let pk = xmss.public_key();

        for i in 0..16u32 {
            assert_eq!(xmss.index(), i);
            let sig = xmss.sign(b"basic").unwrap();
            assert_eq!(&sig[..4], &i.to_be_bytes());
            assert!(verify(b"basic", &sig, &pk).unwrap(), "leaf {}", i);
        }

        assert_eq!(
            xmss.sign(b"basic"),
            Err(XmssError::KeyExhausted { capacity: 16 })
        );
        assert_eq!(xmss.index(), 16);
    }

    #[test]
    fn test_from_extended_seed() {
        let xmss =
            XmssBasic::new(&[5u8; SEED_SIZE], 6, HashFunction::Shake256, AddrFormat::Sha256_2x)
                .unwrap();
        let rebuilt = XmssBasic::from_extended_seed(&xmss.extended_seed()).unwrap();
        assert_eq!(rebuilt.public_key(), xmss.public_key());
        assert_eq!(rebuilt.height(), 6);
        assert_eq!(rebuilt.hash_function(), HashFunction::Shake256);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(matches!(
            XmssBasic::new(&[0u8; SEED_SIZE], 3, HashFunction::Shake128, AddrFormat::Sha256_2x),
            Err(XmssError::InvalidParameter { field: "height", .. })
        ));
        assert!(matches!(
            XmssBasic::new(&[0u8; 32], 4, HashFunction::Shake128, AddrFormat::Sha256_2x),
            Err(XmssError::InvalidParameter { field: "seed", .. })
        ));
        assert!(XmssBasic::from_extended_seed(&[0u8; 48]).is_err());
    }
}
