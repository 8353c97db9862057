//! Checksum primitives for mirrored artifacts.
//!
//! Upstreams publish digests as hex strings in whatever case they like. This
//! crate normalizes them into [`Checksum`] values and verifies downloaded
//! bytes incrementally, so a body is hashed while it streams in rather than in
//! a second pass.
//!
//! # Example
//!
//! ```
//! use uvmirror_verify::{Checksum, Sha256Hasher, Verification};
//!
//! let expected: Checksum =
//!     "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9".parse().unwrap();
//!
//! let mut verification = Verification::new(Sha256Hasher::new(), Some(expected));
//! verification.update(b"hello ");
//! verification.update(b"world");
//! let actual = verification.finish().unwrap();
//! assert_eq!(actual.as_str(), "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
//! ```

pub use self::checksum::Checksum;
pub use self::error::{ChecksumMismatch, Result, VerificationError};
pub use self::hasher::{Hasher, Sha256Hasher};
pub use self::verification::Verification;

mod checksum;
mod error;
mod hasher;
mod verification;
