//! State shared by the XMSS signer flavors.
//!
//! [`XmssBase`] owns the seed, the descriptor and the secret key, and
//! enforces the one-time-key invariant: a leaf is signed at most once and
//! the index never wraps. [`XmssSigner`] is the common interface of the
//! basic and fast flavors, which differ only in how they obtain the
//! authentication path.

use crate::address::get_address;
use crate::descriptor::{AddrFormat, Descriptor};
use crate::error::{Result, XmssError};
use crate::hash::HashFunction;
use crate::keygen::{expand_seed, PublicKey, SecretKey};
use crate::params::{
    ADDRESS_SIZE, DESCRIPTOR_SIZE, EXTENDED_PUBLIC_KEY_SIZE, EXTENDED_SEED_SIZE, N,
    SECRET_KEY_SIZE, SEED_SIZE,
};
use crate::sign::{sign_at_index, Signature};
use tracing::trace;
use zeroize::Zeroize;

/// Seed, descriptor and key state of one XMSS tree.
pub struct XmssBase {
    seed: [u8; SEED_SIZE],
    descriptor: Descriptor,
    sk: SecretKey,
    public_key: PublicKey,
    address: [u8; ADDRESS_SIZE],
}

impl Drop for XmssBase {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

impl XmssBase {
    /// Expands `seed` and lets `build` compute the tree root.
    ///
    /// `build` receives the expanded secret key (root still zero) and
    /// returns the root together with any per-flavor traversal state.
    pub(crate) fn with_root<T>(
        seed: &[u8],
        descriptor: Descriptor,
        build: impl FnOnce(&SecretKey) -> (T, [u8; N]),
    ) -> Result<(Self, T)> {
        let (sk_seed, sk_prf, pub_seed) = expand_seed(seed)?;
        let mut sk = SecretKey {
            index: 0,
            sk_seed,
            sk_prf,
            pub_seed,
            root: [0u8; N],
        };
        let (extra, root) = build(&sk);
        sk.root = root;

        let public_key = sk.public_key(descriptor);
        let address = get_address(&public_key.to_bytes())?;

        let mut owned_seed = [0u8; SEED_SIZE];
        owned_seed.copy_from_slice(seed);

        Ok((
            XmssBase {
                seed: owned_seed,
                descriptor,
                sk,
                public_key,
                address,
            },
            extra,
        ))
    }

    /// Splits a 51-byte extended seed into descriptor and seed.
    pub(crate) fn split_extended_seed(extended_seed: &[u8]) -> Result<(Descriptor, &[u8])> {
        let descriptor = Descriptor::from_extended_seed(extended_seed)?;
        Ok((descriptor, &extended_seed[DESCRIPTOR_SIZE..]))
    }

    /// Fails with `KeyExhausted` once every leaf has been used.
    pub(crate) fn check_not_exhausted(&self) -> Result<()> {
        if u64::from(self.sk.index) >= self.number_signatures() {
            return Err(XmssError::KeyExhausted {
                capacity: self.number_signatures(),
            });
        }
        Ok(())
    }

    /// Signs at the current index with `auth`, then consumes the leaf.
    pub(crate) fn sign_and_advance(&mut self, message: &[u8], auth: Vec<[u8; N]>) -> Result<Signature> {
        self.check_not_exhausted()?;
        let sig = sign_at_index(self.hash_function(), &self.sk, message, auth);
        self.sk.index += 1;
        trace!(index = sig.index, height = self.height(), "xmss signature");
        Ok(sig)
    }

    /// Repositions the index without signing.
    pub(crate) fn set_index_unchecked(&mut self, index: u32) {
        self.sk.index = index;
    }

    /// Secret key state.
    #[inline]
    pub(crate) fn sk(&self) -> &SecretKey {
        &self.sk
    }

    /// Tree height.
    #[inline]
    pub fn height(&self) -> u8 {
        self.descriptor.height()
    }

    /// Hash family.
    #[inline]
    pub fn hash_function(&self) -> HashFunction {
        self.descriptor.hash_function()
    }

    /// Address format.
    #[inline]
    pub fn addr_format(&self) -> AddrFormat {
        self.descriptor.addr_format()
    }

    /// Index of the next leaf to sign with.
    #[inline]
    pub fn index(&self) -> u32 {
        self.sk.index
    }

    /// Serialized secret key (132 bytes).
    pub fn secret_key(&self) -> [u8; SECRET_KEY_SIZE] {
        self.sk.to_bytes()
    }

    /// The 48-byte seed.
    #[inline]
    pub fn seed(&self) -> &[u8; SEED_SIZE] {
        &self.seed
    }

    /// Descriptor followed by the seed (51 bytes).
    pub fn extended_seed(&self) -> [u8; EXTENDED_SEED_SIZE] {
        let mut out = [0u8; EXTENDED_SEED_SIZE];
        out[..DESCRIPTOR_SIZE].copy_from_slice(&self.descriptor.to_bytes());
        out[DESCRIPTOR_SIZE..].copy_from_slice(&self.seed);
        out
    }

    /// Extended public key (67 bytes).
    pub fn public_key(&self) -> [u8; EXTENDED_PUBLIC_KEY_SIZE] {
        self.public_key.to_bytes()
    }

    /// Parsed public key.
    #[inline]
    pub fn typed_public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Merkle root.
    #[inline]
    pub fn root(&self) -> &[u8; N] {
        &self.sk.root
    }

    /// Descriptor.
    #[inline]
    pub fn descriptor(&self) -> Descriptor {
        self.descriptor
    }

    /// Packed descriptor (3 bytes).
    pub fn descriptor_bytes(&self) -> [u8; DESCRIPTOR_SIZE] {
        self.descriptor.to_bytes()
    }

    /// Ledger address (39 bytes).
    #[inline]
    pub fn address(&self) -> [u8; ADDRESS_SIZE] {
        self.address
    }

    /// Number of leaves, 2^H.
    #[inline]
    pub fn number_signatures(&self) -> u64 {
        self.descriptor.params().leaf_count()
    }

    /// Leaves not used yet.
    pub fn remaining_signatures(&self) -> u64 {
        self.number_signatures()
            .saturating_sub(u64::from(self.sk.index))
    }

    /// Signature size for this tree.
    #[inline]
    pub fn signature_size(&self) -> usize {
        self.descriptor.params().signature_size()
    }
}

/// Common interface of the XMSS signer flavors.
///
/// Accessors forward to the shared [`XmssBase`].
pub trait XmssSigner {
    /// Shared key state.
    fn base(&self) -> &XmssBase;

    /// Signs `message` with the next unused leaf.
    ///
    /// # Errors
    ///
    /// `KeyExhausted` when all 2^H leaves have been used.
    fn sign_typed(&mut self, message: &[u8]) -> Result<Signature>;

    /// Signs `message` and serializes the signature.
    fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        self.sign_typed(message).map(|sig| sig.to_bytes())
    }

    /// Tree height.
    fn height(&self) -> u8 {
        self.base().height()
    }

    /// Hash family.
    fn hash_function(&self) -> HashFunction {
        self.base().hash_function()
    }

    /// Address format.
    fn addr_format(&self) -> AddrFormat {
        self.base().addr_format()
    }

    /// Index of the next leaf to sign with.
    fn index(&self) -> u32 {
        self.base().index()
    }

    /// Serialized secret key.
    fn secret_key(&self) -> [u8; SECRET_KEY_SIZE] {
        self.base().secret_key()
    }

    /// The 48-byte seed.
    fn seed(&self) -> &[u8; SEED_SIZE] {
        self.base().seed()
    }

    /// Descriptor followed by the seed.
    fn extended_seed(&self) -> [u8; EXTENDED_SEED_SIZE] {
        self.base().extended_seed()
    }

    /// Extended public key.
    fn public_key(&self) -> [u8; EXTENDED_PUBLIC_KEY_SIZE] {
        self.base().public_key()
    }

    /// Descriptor.
    fn descriptor(&self) -> Descriptor {
        self.base().descriptor()
    }

    /// Packed descriptor.
    fn descriptor_bytes(&self) -> [u8; DESCRIPTOR_SIZE] {
        self.base().descriptor_bytes()
    }

    /// Ledger address.
    fn address(&self) -> [u8; ADDRESS_SIZE] {
        self.base().address()
    }

    /// Number of leaves.
    fn number_signatures(&self) -> u64 {
        self.base().number_signatures()
    }

    /// Leaves not used yet.
    fn remaining_signatures(&self) -> u64 {
        self.base().remaining_signatures()
    }

    /// Signature size.
    fn signature_size(&self) -> usize {
        self.base().signature_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_root;

    fn base(height: u8) -> XmssBase {
        let desc = Descriptor::new(HashFunction::Shake128, height, AddrFormat::Sha256_2x).unwrap();
        let (base, ()) = XmssBase::with_root(&[0u8; SEED_SIZE], desc, |sk| {
            let root = build_root(
                HashFunction::Shake128,
                &sk.sk_seed,
                &sk.pub_seed,
                u32::from(height),
            );
            ((), root)
        })
        .unwrap();
        base
    }

    #[test]
    fn test_known_public_key_and_address() {
        let base = base(4);
        assert_eq!(hex::encode(base.descriptor_bytes()), "010200");
        assert_eq!(
            hex::encode(base.public_key()),
            "010200c25188b585f731c128e2b457069eafd1e3fa3961605af8c58a1aec4d82ac316d3191da3442686282b3d5160f25cf162a517fd2131f83fbf2698a58f9c46afc5d"
        );
        assert_eq!(
            hex::encode(base.address()),
            "01020095f03f084bcb29b96b0529c17ce92c54c1e8290193a93803812ead95e8e6902506b67897"
        );
    }

    #[test]
    fn test_extended_seed_and_secret_key() {
        let base = base(4);
        let ext = base.extended_seed();
        assert_eq!(&ext[..3], &[1, 2, 0]);
        assert_eq!(&ext[3..], &[0u8; SEED_SIZE]);

        let sk = base.secret_key();
        assert_eq!(&sk[..4], &[0u8; 4]);
        assert_eq!(&sk[100..], base.root());
        assert_eq!(&sk[68..100], &base.public_key()[35..]);
    }

    #[test]
    fn test_exhaustion_check() {
        let mut base = base(4);
        assert_eq!(base.remaining_signatures(), 16);
        base.set_index_unchecked(15);
        assert!(base.check_not_exhausted().is_ok());
        assert_eq!(base.remaining_signatures(), 1);
        base.set_index_unchecked(16);
        assert_eq!(
            base.check_not_exhausted(),
            Err(XmssError::KeyExhausted { capacity: 16 })
        );
        assert_eq!(base.remaining_signatures(), 0);
    }

    #[test]
    fn test_bad_seed_length() {
        let desc = Descriptor::new(HashFunction::Sha2_256, 4, AddrFormat::Sha256_2x).unwrap();
        let result = XmssBase::with_root(&[0u8; 47], desc, |_| ((), [0u8; N]));
        assert!(matches!(result, Err(XmssError::InvalidParameter { .. })));
    }
}
