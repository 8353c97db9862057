use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::VerificationError;

/// A hex-encoded digest, always stored in lowercase.
///
/// Equality is plain string equality, which is case-insensitive with respect
/// to the text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum(String);

impl Checksum {
    /// Hex-encode a raw digest.
    pub fn from_digest(digest: &[u8]) -> Self { Self(hex::encode(digest)) }

    /// SHA-256 of `data` in one shot.
    pub fn sha256(data: &[u8]) -> Self { Self::from_digest(&Sha256::digest(data)) }

    /// Parse the body of a checksum sidecar file.
    ///
    /// Sidecars look like `<hex>  <file name>`; only the first
    /// whitespace-delimited token is significant.
    pub fn from_sidecar(text: &str) -> Result<Self, VerificationError> {
        text.split_whitespace()
            .next()
            .ok_or_else(|| VerificationError::InvalidChecksum(text.to_string()))?
            .parse()
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for Checksum {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.len() % 2 != 0 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VerificationError::InvalidChecksum(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
