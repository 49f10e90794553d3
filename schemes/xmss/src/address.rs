//! Ledger address derived from an extended public key.
//!
//! ```text
//! address = descriptor (3) || SHA2-256(extended_pk) (32) || checksum (4)
//! checksum = last 4 bytes of SHA2-256(descriptor || SHA2-256(extended_pk))
//! ```

use crate::descriptor::{AddrFormat, Descriptor};
use crate::error::Result;
use crate::hashing::sha2_256;
use crate::params::{ADDRESS_SIZE, DESCRIPTOR_SIZE, N};

const CHECKSUM_SIZE: usize = 4;

fn checksum(prefix: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let digest = sha2_256(prefix);
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&digest[N - CHECKSUM_SIZE..]);
    out
}

/// Computes the address of a 67-byte extended public key.
pub fn get_address(extended_pk: &[u8]) -> Result<[u8; ADDRESS_SIZE]> {
    Descriptor::from_extended_pk(extended_pk)?;

    let mut address = [0u8; ADDRESS_SIZE];
    address[..DESCRIPTOR_SIZE].copy_from_slice(&extended_pk[..DESCRIPTOR_SIZE]);
    address[DESCRIPTOR_SIZE..DESCRIPTOR_SIZE + N].copy_from_slice(&sha2_256(extended_pk));
    let sum = checksum(&address[..DESCRIPTOR_SIZE + N]);
    address[DESCRIPTOR_SIZE + N..].copy_from_slice(&sum);
    Ok(address)
}

/// Checks the structure and checksum of an address.
///
/// Never fails: anything that is not a well-formed address is `false`.
pub fn address_is_valid(address: &[u8]) -> bool {
    if address.len() != ADDRESS_SIZE {
        return false;
    }
    let descriptor = match Descriptor::from_bytes(&address[..DESCRIPTOR_SIZE]) {
        Ok(descriptor) => descriptor,
        Err(_) => return false,
    };
    if descriptor.addr_format() != AddrFormat::Sha256_2x {
        return false;
    }
    checksum(&address[..DESCRIPTOR_SIZE + N])[..] == address[DESCRIPTOR_SIZE + N..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XmssError;
    use crate::params::EXTENDED_PUBLIC_KEY_SIZE;

    fn sample_pk() -> [u8; EXTENDED_PUBLIC_KEY_SIZE] {
        let mut pk = [0x42u8; EXTENDED_PUBLIC_KEY_SIZE];
        pk[..3].copy_from_slice(&[0x01, 0x02, 0x00]);
        pk
    }

    #[test]
    fn test_address_layout() {
        let pk = sample_pk();
        let address = get_address(&pk).unwrap();
        assert_eq!(&address[..3], &pk[..3]);
        assert_eq!(&address[3..35], &sha2_256(&pk));
        assert!(address_is_valid(&address));
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let address = get_address(&sample_pk()).unwrap();
        for byte in 3..ADDRESS_SIZE {
            let mut corrupted = address;
            corrupted[byte] ^= 0x01;
            assert!(!address_is_valid(&corrupted), "byte {}", byte);
        }
    }

    #[test]
    fn test_short_inputs_are_invalid() {
        assert!(!address_is_valid(&[]));
        assert!(!address_is_valid(&[0x01]));
        assert!(!address_is_valid(&[0u8; 20]));
        assert!(!address_is_valid(&[0u8; ADDRESS_SIZE + 1]));
    }

    #[test]
    fn test_bad_descriptor_is_invalid() {
        let mut address = get_address(&sample_pk()).unwrap();
        address[0] = 0x0F;
        assert!(!address_is_valid(&address));
    }

    #[test]
    fn test_get_address_rejects_bad_length() {
        assert!(matches!(
            get_address(&[0u8; 10]),
            Err(XmssError::MalformedInput { .. })
        ));
    }
}
