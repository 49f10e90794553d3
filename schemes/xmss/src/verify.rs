//! Signature verification for XMSS.
//!
//! Verification is stateless. A wrong-length signature or public key is a
//! caller error; a well-formed signature that does not check out is simply
//! `false`.

use crate::error::Result;
use crate::keygen::PublicKey;
use crate::sign::{message_digest, Signature};
use crate::tree::verify_path;
use crate::wots::leaf_from_sig;

/// Verifies a serialized signature against a 67-byte extended public key.
///
/// The tree height and hash family are read from the key's descriptor.
///
/// # Errors
///
/// `MalformedInput` for wrong key or signature lengths, and the descriptor
/// errors of [`PublicKey::from_bytes`].
pub fn verify(message: &[u8], signature: &[u8], extended_pk: &[u8]) -> Result<bool> {
    let pk = PublicKey::from_bytes(extended_pk)?;
    let sig = Signature::from_bytes(signature, pk.descriptor.params())?;
    Ok(verify_signature(&pk, message, &sig))
}

/// Verifies a parsed signature.
pub fn verify_signature(pk: &PublicKey, message: &[u8], sig: &Signature) -> bool {
    let params = pk.descriptor.params();
    if u64::from(sig.index) >= params.leaf_count() {
        return false;
    }
    if sig.auth.len() != usize::from(params.height()) {
        return false;
    }

    let hash_fn = pk.descriptor.hash_function();
    let digest = message_digest(hash_fn, &sig.r, &pk.root, sig.index, message);
    let leaf = leaf_from_sig(hash_fn, &sig.wots_sig, &digest, &pk.pub_seed, sig.index);
    verify_path(hash_fn, &leaf, sig.index, &sig.auth, &pk.root, &pk.pub_seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AddrFormat, Descriptor};
    use crate::error::XmssError;
    use crate::hash::HashFunction;
    use crate::keygen::{expand_seed, SecretKey};
    use crate::params::{N, SEED_SIZE};
    use crate::sign::sign_at_index;
    use crate::tree::{auth_path, build_root};

    fn keypair(hash_fn: HashFunction, height: u8) -> (PublicKey, SecretKey) {
        let (sk_seed, sk_prf, pub_seed) = expand_seed(&[0u8; SEED_SIZE]).unwrap();
        let root = build_root(hash_fn, &sk_seed, &pub_seed, u32::from(height));
        let sk = SecretKey {
            index: 0,
            sk_seed,
            sk_prf,
            pub_seed,
            root,
        };
        let desc = Descriptor::new(hash_fn, height, AddrFormat::Sha256_2x).unwrap();
        (sk.public_key(desc), sk)
    }

    fn sign(sk: &SecretKey, hash_fn: HashFunction, height: u8, message: &[u8]) -> Signature {
        let auth = auth_path(
            hash_fn,
            &sk.sk_seed,
            &sk.pub_seed,
            u32::from(height),
            sk.index,
        );
        sign_at_index(hash_fn, sk, message, auth)
    }

    #[test]
    fn test_sign_verify() {
        let (pk, mut sk) = keypair(HashFunction::Shake128, 4);
        sk.index = 3;
        let sig = sign(&sk, HashFunction::Shake128, 4, b"message");
        assert!(verify_signature(&pk, b"message", &sig));
        assert!(!verify_signature(&pk, b"massage", &sig));
        assert!(verify(b"message", &sig.to_bytes(), &pk.to_bytes()).unwrap());
    }

    #[test]
    fn test_index_beyond_tree_is_false() {
        let (pk, sk) = keypair(HashFunction::Sha2_256, 4);
        let mut sig = sign(&sk, HashFunction::Sha2_256, 4, b"message");
        sig.index = 16;
        assert_eq!(verify(b"message", &sig.to_bytes(), &pk.to_bytes()), Ok(false));
        sig.index = u32::MAX;
        assert!(!verify_signature(&pk, b"message", &sig));
    }

    #[test]
    fn test_wrong_lengths_are_errors() {
        let (pk, sk) = keypair(HashFunction::Sha2_256, 4);
        let sig = sign(&sk, HashFunction::Sha2_256, 4, b"message").to_bytes();

        assert!(matches!(
            verify(b"message", &sig[..sig.len() - 1], &pk.to_bytes()),
            Err(XmssError::MalformedInput { field: "signature", .. })
        ));
        assert!(matches!(
            verify(b"message", &sig, &pk.to_bytes()[..66]),
            Err(XmssError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_unknown_descriptor_is_error() {
        let (pk, sk) = keypair(HashFunction::Sha2_256, 4);
        let sig = sign(&sk, HashFunction::Sha2_256, 4, b"message").to_bytes();
        let mut epk = pk.to_bytes();
        epk[0] = 0x07;
        assert!(matches!(
            verify(b"message", &sig, &epk),
            Err(XmssError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn test_wrong_key_is_false() {
        let (_, sk) = keypair(HashFunction::Shake256, 4);
        let sig = sign(&sk, HashFunction::Shake256, 4, b"message");
        let other = PublicKey {
            descriptor: Descriptor::new(HashFunction::Shake256, 4, AddrFormat::Sha256_2x).unwrap(),
            root: [9u8; N],
            pub_seed: sk.pub_seed,
        };
        assert!(!verify_signature(&other, b"message", &sig));
    }
}
