//! Upstream manifests and the filters that decide what gets mirrored.
//!
//! A [`ManifestSource`] knows three things about one upstream:
//! how to fetch its raw manifest, which entries are in scope (and under which
//! storage key), and which bucket keys it owns. Ownership matters because
//! several sources share one bucket; a source may only ever prune keys it owns.

mod artifact;
mod error;
pub mod python;
pub mod release;

use std::future::Future;

use uvmirror_fetch::{Fetcher, HttpClient};

pub use artifact::{ArtifactRef, ChecksumSource};
pub use error::{Result, SourceError};
pub use python::{PythonConfig, PythonDownloads, Upstream};
pub use release::{GithubRelease, ReleaseConfig};

pub trait ManifestSource: Send + Sync {
    /// Raw manifest entry, before filtering.
    type Entry: Send;

    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Fetch the complete upstream manifest.
    fn fetch_manifest<C: HttpClient>(
        &self,
        fetcher: &Fetcher<C>,
    ) -> impl Future<Output = Result<Vec<Self::Entry>>> + Send;

    /// Mirror filter: `Ok(None)` for entries that are out of scope, the
    /// derived artifact otherwise.
    fn select(&self, entry: &Self::Entry) -> Result<Option<ArtifactRef>>;

    /// Whether a bucket key belongs to this source's namespace.
    fn owns(&self, key: &str) -> bool;

    /// Apply [`select`](Self::select) to a whole manifest.
    fn select_all(&self, entries: &[Self::Entry]) -> Result<Vec<ArtifactRef>> {
        let mut selected = Vec::new();
        for entry in entries {
            if let Some(artifact) = self.select(entry)? {
                selected.push(artifact);
            }
        }
        Ok(selected)
    }
}
