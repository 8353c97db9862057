//! Digest algorithms that feed a [`Verification`](crate::Verification).

use sha2::{Digest, Sha256};

use crate::Checksum;

/// An incremental digest that ends in a [`Checksum`].
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);

    fn checksum(self) -> Checksum;
}

#[derive(Default)]
pub struct Sha256Hasher(Sha256);

impl Sha256Hasher {
    pub fn new() -> Self { Self::default() }
}

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }

    fn checksum(self) -> Checksum { Checksum::from_digest(&self.0.finalize()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunked_matches_one_shot() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hasher.checksum(), Checksum::sha256(b"hello world"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            Sha256Hasher::new().checksum().as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
