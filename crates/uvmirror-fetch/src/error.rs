//! Error types for uvmirror-fetch.

use thiserror::Error;
use uvmirror_verify::Checksum;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url:      String,
        expected: Checksum,
        actual:   Checksum,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url:    String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Status { url, .. }
            | Self::ChecksumMismatch { url, .. }
            | Self::Decode { url, .. } => url,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
