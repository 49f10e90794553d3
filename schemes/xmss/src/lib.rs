//! XMSS (eXtended Merkle Signature Scheme) with WOTS+ leaves, in the
//! parameterization used by the QRL ledger.
//!
//! XMSS is a stateful hash-based signature scheme: a Merkle tree of height
//! H commits to 2^H one-time key pairs, and every signature consumes one
//! of them. The signer's index must never repeat.
//!
//! # Parameters
//!
//! | Item | Value |
//! |------|-------|
//! | Hash output n | 32 bytes |
//! | Winternitz w | 16 |
//! | Chains per leaf | 67 |
//! | Tree heights | 4, 6, ..., 30 |
//! | Hash families | SHA2-256, SHAKE128, SHAKE256 |
//! | Signature size | 2180 + 32·H bytes |
//!
//! # Example Usage
//!
//! ```rust
//! use pqsigs_xmss::{verify, AddrFormat, HashFunction, XmssFast, XmssSigner};
//!
//! let seed = [7u8; 48];
//! let mut signer = XmssFast::new(&seed, 4, HashFunction::Shake128, AddrFormat::Sha256_2x)
//!     .expect("valid parameters");
//!
//! let message = b"Hello, post-quantum world!";
//! let signature = signer.sign(message).expect("leaves remain");
//!
//! assert!(verify(message, &signature, &signer.public_key()).unwrap());
//! assert_eq!(signer.index(), 1);
//! ```
//!
//! # Signer Flavors
//!
//! - [`XmssBasic`]: recomputes the authentication path for every signature
//! - [`XmssFast`]: keeps BDS traversal state, and can skip ahead with
//!   [`XmssFast::set_index`]
//!
//! Both produce identical signatures for the same seed, parameters, index
//! and message. [`XmssPool`] builds fast signers ahead of demand on a
//! background thread.
//!
//! # Security Warning
//!
//! This implementation:
//! - Is NOT constant-time and may leak information through timing
//! - Has NOT been audited by security professionals
//! - Keeps signer state in memory only; persisting the index is the
//!   caller's job
//!
//! # References
//!
//! - RFC 8391: XMSS: eXtended Merkle Signature Scheme
//! - Buchmann, Dahmen, Szydlo: Hash-based Digital Signature Schemes

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod address;
pub mod adrs;
pub mod basic;
pub mod bds;
pub mod descriptor;
pub mod error;
pub mod fast;
pub mod hash;
pub mod hashing;
pub mod keygen;
pub mod params;
pub mod pool;
pub mod seed;
pub mod sign;
pub mod signer;
pub mod tree;
pub mod verify;
pub mod wots;

pub use address::{address_is_valid, get_address};
pub use basic::XmssBasic;
pub use descriptor::{AddrFormat, Descriptor, SignatureType};
pub use error::{Result, XmssError};
pub use fast::XmssFast;
pub use hash::HashFunction;
pub use keygen::{PublicKey, SecretKey};
pub use params::{height_from_signature_size, XmssParams};
pub use pool::{PoolConfig, XmssPool};
pub use sign::Signature;
pub use signer::{XmssBase, XmssSigner};
pub use verify::{verify, verify_signature};
