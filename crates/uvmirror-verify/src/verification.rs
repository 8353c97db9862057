use crate::{Checksum, ChecksumMismatch, Hasher};

/// Incremental digest over a body that arrives in chunks.
/// Feed every chunk through [`update`](Self::update), then call
/// [`finish`](Self::finish) once the body is complete.
pub struct Verification<H> {
    hasher:   H,
    expected: Option<Checksum>,
}

impl<H: Hasher> Verification<H> {
    /// Create a verification. With `expected` set to `None` the digest is still
    /// computed, but `finish` never fails.
    pub fn new(hasher: H, expected: Option<Checksum>) -> Self { Self { hasher, expected } }

    pub fn update(&mut self, data: &[u8]) { self.hasher.update(data); }

    /// Finalize the digest and compare it against the expected checksum.
    /// Returns the actual checksum on success.
    pub fn finish(self) -> Result<Checksum, ChecksumMismatch> {
        let actual = self.hasher.checksum();
        match self.expected {
            Some(expected) if expected != actual => Err(ChecksumMismatch { expected, actual }),
            _ => Ok(actual),
        }
    }
}
