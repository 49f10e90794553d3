//! Qualified descriptor: the 3-byte prefix naming the scheme, hash family,
//! address format and tree height of a key.
//!
//! # Layout
//!
//! ```text
//! byte 0: signature type (high nibble) | hash function (low nibble)
//! byte 1: address format (high nibble) | height / 2 (low nibble)
//! byte 2: reserved, always 0
//! ```

use crate::error::{Result, XmssError};
use crate::hash::HashFunction;
use crate::params::{XmssParams, DESCRIPTOR_SIZE, EXTENDED_PUBLIC_KEY_SIZE, EXTENDED_SEED_SIZE};

/// Signature scheme tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignatureType {
    /// XMSS with WOTS+ leaves
    Xmss = 0,
}

impl TryFrom<u8> for SignatureType {
    type Error = XmssError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(SignatureType::Xmss),
            _ => Err(XmssError::UnsupportedAlgorithm {
                field: "signature type",
                tag,
            }),
        }
    }
}

/// Address format tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AddrFormat {
    /// Double SHA2-256 address with a 4-byte checksum
    #[default]
    Sha256_2x = 0,
}

impl TryFrom<u8> for AddrFormat {
    type Error = XmssError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(AddrFormat::Sha256_2x),
            _ => Err(XmssError::UnsupportedAlgorithm {
                field: "address format",
                tag,
            }),
        }
    }
}

/// Decoded descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    hash_function: HashFunction,
    signature_type: SignatureType,
    params: XmssParams,
    addr_format: AddrFormat,
}

impl Descriptor {
    /// Creates an XMSS descriptor, validating the height.
    pub fn new(hash_function: HashFunction, height: u8, addr_format: AddrFormat) -> Result<Self> {
        Ok(Descriptor {
            hash_function,
            signature_type: SignatureType::Xmss,
            params: XmssParams::new(height)?,
            addr_format,
        })
    }

    /// Hash family used by every keyed hash of the tree.
    #[inline]
    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    /// Signature scheme.
    #[inline]
    pub fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    /// Tree height.
    #[inline]
    pub fn height(&self) -> u8 {
        self.params.height()
    }

    /// Validated tree parameters.
    #[inline]
    pub fn params(&self) -> XmssParams {
        self.params
    }

    /// Address format.
    #[inline]
    pub fn addr_format(&self) -> AddrFormat {
        self.addr_format
    }

    /// Packs the descriptor into its 3-byte form.
    pub fn to_bytes(&self) -> [u8; DESCRIPTOR_SIZE] {
        [
            ((self.signature_type as u8) << 4) | (self.hash_function.tag() & 0x0F),
            ((self.addr_format as u8) << 4) | ((self.height() >> 1) & 0x0F),
            0,
        ]
    }

    /// Unpacks a 3-byte descriptor.
    ///
    /// Unknown tags and a non-zero reserved byte are rejected, as is a
    /// height outside the supported range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != DESCRIPTOR_SIZE {
            return Err(XmssError::MalformedInput {
                field: "descriptor",
                expected: DESCRIPTOR_SIZE,
                actual: bytes.len(),
            });
        }

        let signature_type = SignatureType::try_from(bytes[0] >> 4)?;
        let hash_function = HashFunction::try_from(bytes[0] & 0x0F)?;
        let addr_format = AddrFormat::try_from(bytes[1] >> 4)?;
        let params = XmssParams::new((bytes[1] & 0x0F) << 1)?;
        if bytes[2] != 0 {
            return Err(XmssError::UnsupportedAlgorithm {
                field: "reserved",
                tag: bytes[2],
            });
        }

        Ok(Descriptor {
            hash_function,
            signature_type,
            params,
            addr_format,
        })
    }

    /// Reads the descriptor prefix of a 51-byte extended seed.
    pub fn from_extended_seed(extended_seed: &[u8]) -> Result<Self> {
        if extended_seed.len() != EXTENDED_SEED_SIZE {
            return Err(XmssError::MalformedInput {
                field: "extended seed",
                expected: EXTENDED_SEED_SIZE,
                actual: extended_seed.len(),
            });
        }
        Self::from_bytes(&extended_seed[..DESCRIPTOR_SIZE])
    }

    /// Reads the descriptor prefix of a 67-byte extended public key.
    pub fn from_extended_pk(extended_pk: &[u8]) -> Result<Self> {
        if extended_pk.len() != EXTENDED_PUBLIC_KEY_SIZE {
            return Err(XmssError::MalformedInput {
                field: "extended public key",
                expected: EXTENDED_PUBLIC_KEY_SIZE,
                actual: extended_pk.len(),
            });
        }
        Self::from_bytes(&extended_pk[..DESCRIPTOR_SIZE])
    }
}
