use uvmirror_verify::Checksum;

/// Where the expected digest of an artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumSource {
    /// Published inline in the manifest.
    Declared(Checksum),

    /// Published next to the artifact; fetched just before the transfer.
    /// A 404 means the upstream publishes no checksum for it.
    Sidecar(String),

    /// Nothing to verify against.
    Absent,
}

/// One artifact that should exist in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    /// Storage key; unique within a manifest.
    pub key:        String,
    pub source_url: String,
    pub checksum:   ChecksumSource,
}

impl ArtifactRef {
    pub fn new(key: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            key:        key.into(),
            source_url: source_url.into(),
            checksum:   ChecksumSource::Absent,
        }
    }

    #[must_use]
    pub fn checksum(mut self, checksum: ChecksumSource) -> Self {
        self.checksum = checksum;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_builder() {
        let artifact = ArtifactRef::new("a", "http://x/a");
        assert_eq!(artifact.key, "a");
        assert_eq!(artifact.source_url, "http://x/a");
        assert_eq!(artifact.checksum, ChecksumSource::Absent);

        let artifact = artifact.checksum(ChecksumSource::Sidecar("http://x/a.sha256".into()));
        assert_eq!(artifact.checksum, ChecksumSource::Sidecar("http://x/a.sha256".into()));
    }
}
