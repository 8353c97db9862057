//! Python interpreter builds listed in uv's download metadata document.
//!
//! The document maps build names to `{ url, sha256, ... }`. Builds hosted on a
//! recognized upstream are mirrored under the URL path that follows the
//! upstream prefix, percent-decoded, so
//! `.../releases/download/20241016/cpython-3.13.0%2B20241016-...tar.gz`
//! becomes `20241016/cpython-3.13.0+20241016-...tar.gz`.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uvmirror_fetch::{FetchOptions, Fetcher, HttpClient};

use crate::{ArtifactRef, ChecksumSource, ManifestSource, Result, SourceError};

/// One value of the metadata document. Other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadEntry {
    pub url:    String,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// A recognized upstream host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
    /// URLs starting with this prefix are mirrored; the rest of the URL is
    /// the storage key.
    pub url_prefix:  String,
    /// Bucket keys matching this pattern belong to this upstream.
    pub key_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    pub metadata_url:   String,
    /// URLs containing this marker are debug builds and never mirrored.
    pub exclude_marker: String,
    pub upstreams:      Vec<Upstream>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            metadata_url:   "https://raw.githubusercontent.com/astral-sh/uv/main/crates/uv-python/download-metadata.json"
                .to_string(),
            exclude_marker: "debug".to_string(),
            upstreams:      vec![
                Upstream {
                    url_prefix:  "https://github.com/astral-sh/python-build-standalone/releases/download/"
                        .to_string(),
                    key_pattern: r"^\d{8}/".to_string(),
                },
                Upstream {
                    url_prefix:  "https://downloads.python.org/pypy/".to_string(),
                    key_pattern: r"^pypy".to_string(),
                },
            ],
        }
    }
}

struct CompiledUpstream {
    url_prefix:  String,
    key_pattern: Regex,
}

pub struct PythonDownloads {
    metadata_url:   String,
    exclude_marker: String,
    upstreams:      Vec<CompiledUpstream>,
}

impl PythonDownloads {
    /// Compile the upstream key patterns.
    ///
    /// Empty settings are rejected: an empty marker would exclude every URL,
    /// and an empty prefix or pattern would claim every bucket key.
    pub fn new(config: &PythonConfig) -> Result<Self> {
        if config.exclude_marker.is_empty() {
            return Err(SourceError::EmptySetting("python.exclude_marker"));
        }
        if config.upstreams.is_empty() {
            return Err(SourceError::EmptySetting("python.upstreams"));
        }
        let upstreams = config
            .upstreams
            .iter()
            .map(|u| {
                if u.url_prefix.is_empty() {
                    return Err(SourceError::EmptySetting("python.upstreams.url_prefix"));
                }
                if u.key_pattern.is_empty() {
                    return Err(SourceError::EmptySetting("python.upstreams.key_pattern"));
                }
                Regex::new(&u.key_pattern)
                    .map(|key_pattern| CompiledUpstream {
                        url_prefix: u.url_prefix.clone(),
                        key_pattern,
                    })
                    .map_err(|source| SourceError::InvalidPattern {
                        pattern: u.key_pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            metadata_url: config.metadata_url.clone(),
            exclude_marker: config.exclude_marker.clone(),
            upstreams,
        })
    }

    /// Derive the storage key for `url`.
    ///
    /// Fails with [`SourceError::UnknownUrlShape`] when no upstream prefix
    /// matches or nothing follows the prefix, and with
    /// [`SourceError::InvalidKeyEncoding`] when the remainder does not decode
    /// to UTF-8.
    pub fn url_to_key(&self, url: &str) -> Result<String> {
        let rest = self
            .upstreams
            .iter()
            .find_map(|u| url.strip_prefix(u.url_prefix.as_str()))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| SourceError::UnknownUrlShape(url.to_string()))?;

        percent_decode_str(rest)
            .decode_utf8()
            .map(|key| key.into_owned())
            .map_err(|_| SourceError::InvalidKeyEncoding { url: url.to_string() })
    }

    fn is_recognized(&self, url: &str) -> bool {
        self.upstreams.iter().any(|u| url.starts_with(u.url_prefix.as_str()))
    }
}

impl ManifestSource for PythonDownloads {
    type Entry = DownloadEntry;

    fn name(&self) -> &str { "python" }

    async fn fetch_manifest<C: HttpClient>(&self, fetcher: &Fetcher<C>) -> Result<Vec<DownloadEntry>> {
        let document: BTreeMap<String, DownloadEntry> = fetcher
            .fetch_json(&self.metadata_url, &FetchOptions::default())
            .await?;
        info!(url = %self.metadata_url, entries = document.len(), "fetched download metadata");
        Ok(document.into_values().collect())
    }

    fn select(&self, entry: &DownloadEntry) -> Result<Option<ArtifactRef>> {
        if entry.url.contains(self.exclude_marker.as_str()) || !self.is_recognized(&entry.url) {
            return Ok(None);
        }

        let key = self.url_to_key(&entry.url)?;
        if !self.owns(&key) {
            warn!(key, "mirrored key falls outside every upstream key pattern and will never be pruned");
        }

        let checksum = match &entry.sha256 {
            Some(sha256) => ChecksumSource::Declared(sha256.parse().map_err(|source| {
                SourceError::InvalidChecksum {
                    url: entry.url.clone(),
                    source,
                }
            })?),
            None => ChecksumSource::Absent,
        };

        Ok(Some(ArtifactRef::new(key, entry.url.clone()).checksum(checksum)))
    }

    fn owns(&self, key: &str) -> bool { self.upstreams.iter().any(|u| u.key_pattern.is_match(key)) }
}
