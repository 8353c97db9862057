use thiserror::Error;

use crate::Checksum;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("invalid checksum {0:?}: expected a hex digest")]
    InvalidChecksum(String),
}

/// A finished digest that differs from the one that was expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checksum mismatch: expected {expected}, got {actual}")]
pub struct ChecksumMismatch {
    pub expected: Checksum,
    pub actual:   Checksum,
}

pub type Result<T> = std::result::Result<T, VerificationError>;
