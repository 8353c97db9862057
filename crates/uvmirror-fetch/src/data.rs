//! Data layer: immutable request options and fetch results.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uvmirror_verify::Checksum;

/// Per-request options.
///
/// # Examples
///
/// ```
/// use uvmirror_fetch::FetchOptions;
///
/// let options = FetchOptions::default()
///     .header("Accept", "application/vnd.github+json")
///     .bearer_auth("token");
/// assert_eq!(options.headers.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Expected digest of the body. When set, a body that hashes to anything
    /// else fails with [`FetchError::ChecksumMismatch`](crate::FetchError::ChecksumMismatch).
    pub checksum: Option<Checksum>,

    /// Extra request headers, sent in order.
    pub headers: Arc<[(String, String)]>,
}

impl FetchOptions {
    #[must_use]
    pub fn checksum(mut self, checksum: Option<Checksum>) -> Self {
        self.checksum = checksum;
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    #[must_use]
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }
}

/// A fully downloaded body together with its digest.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub body:     Bytes,
    pub checksum: Checksum,
}

/// Settings used to build the production HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub user_agent:           String,
    pub connect_timeout_secs: u64,
    /// Whole-request timeout. Interpreter builds run to hundreds of megabytes,
    /// so keep this generous.
    pub timeout_secs:         Option<u64>,
    pub proxy:                Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            user_agent:           concat!("uvmirror/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 30,
            timeout_secs:         Some(1800),
            proxy:                None,
        }
    }
}
