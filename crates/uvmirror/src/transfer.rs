//! Verified download-then-upload of single artifacts, and a bounded pool
//! that runs many of them concurrently.
//!
//! A transfer never returns an error. Every failure is captured in its
//! [`TransferResult`] so one bad artifact cannot stop the others.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uvmirror_fetch::{FetchError, FetchOptions, Fetcher, HttpClient};
use uvmirror_source::{ArtifactRef, ChecksumSource};
use uvmirror_store::ObjectStore;
use uvmirror_verify::Checksum;

use crate::error::TransferError;

#[derive(Debug)]
pub enum TransferResult {
    Success { key: String, bytes: u64 },
    Failure { key: String, error: TransferError },
}

impl TransferResult {
    pub fn key(&self) -> &str {
        match self {
            Self::Success { key, .. } | Self::Failure { key, .. } => key,
        }
    }

    pub fn is_success(&self) -> bool { matches!(self, Self::Success { .. }) }
}

/// Download `artifact`, verify it, and put it into `store`.
///
/// The object is only written after the full body has matched its expected
/// checksum.
pub async fn transfer<C, S>(fetcher: &Fetcher<C>, store: &S, artifact: &ArtifactRef) -> TransferResult
where
    C: HttpClient,
    S: ObjectStore,
{
    match try_transfer(fetcher, store, artifact).await {
        Ok(bytes) => {
            info!(key = %artifact.key, bytes, "uploaded");
            TransferResult::Success {
                key: artifact.key.clone(),
                bytes,
            }
        }
        Err(error) => {
            warn!(key = %artifact.key, url = %artifact.source_url, %error, "transfer failed");
            TransferResult::Failure {
                key: artifact.key.clone(),
                error,
            }
        }
    }
}

async fn try_transfer<C, S>(fetcher: &Fetcher<C>, store: &S, artifact: &ArtifactRef) -> Result<u64, TransferError>
where
    C: HttpClient,
    S: ObjectStore,
{
    let expected = resolve_checksum(fetcher, &artifact.checksum).await?;
    if expected.is_none() {
        debug!(key = %artifact.key, "no checksum published, uploading unverified");
    }

    let fetched = fetcher
        .fetch(&artifact.source_url, &FetchOptions::default().checksum(expected))
        .await
        .map_err(|e| match e {
            FetchError::ChecksumMismatch { expected, actual, .. } => {
                TransferError::ChecksumMismatch { expected, actual }
            }
            other => TransferError::Download(other),
        })?;

    let bytes = fetched.body.len() as u64;
    store
        .put(&artifact.key, fetched.body)
        .await
        .map_err(TransferError::Upload)?;
    Ok(bytes)
}

/// Turn a [`ChecksumSource`] into the digest to verify against, if any.
async fn resolve_checksum<C: HttpClient>(
    fetcher: &Fetcher<C>,
    source: &ChecksumSource,
) -> Result<Option<Checksum>, TransferError> {
    match source {
        ChecksumSource::Declared(checksum) => Ok(Some(checksum.clone())),
        ChecksumSource::Absent => Ok(None),
        ChecksumSource::Sidecar(url) => {
            let Some(sidecar) = fetcher
                .fetch_optional(url, &FetchOptions::default())
                .await
                .map_err(TransferError::ChecksumLookup)?
            else {
                return Ok(None);
            };
            let text = String::from_utf8_lossy(&sidecar.body);
            Checksum::from_sidecar(&text)
                .map(Some)
                .map_err(|source| TransferError::InvalidSidecar {
                    url: url.clone(),
                    source,
                })
        }
    }
}

/// Runs transfers with at most `max_concurrent` in flight.
#[derive(Debug, Clone, Copy)]
pub struct TransferPool {
    max_concurrent: usize,
}

impl Default for TransferPool {
    fn default() -> Self { Self::new(Self::DEFAULT_CONCURRENCY) }
}

impl TransferPool {
    pub const DEFAULT_CONCURRENCY: usize = 32;

    /// The limit is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    pub fn max_concurrent(&self) -> usize { self.max_concurrent }

    /// Transfer every artifact and return one result per input, in
    /// completion order.
    pub async fn run<C, S>(
        &self,
        fetcher: Arc<Fetcher<C>>,
        store: Arc<S>,
        artifacts: Vec<ArtifactRef>,
    ) -> Vec<TransferResult>
    where
        C: HttpClient + 'static,
        S: ObjectStore,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = FuturesUnordered::new();

        for artifact in artifacts {
            let key = artifact.key.clone();
            let fetcher = Arc::clone(&fetcher);
            let store = Arc::clone(&store);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                transfer(fetcher.as_ref(), store.as_ref(), &artifact).await
            });

            tasks.push(async move {
                handle.await.unwrap_or_else(|e| TransferResult::Failure {
                    key,
                    error: TransferError::Aborted(e.to_string()),
                })
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(result) = tasks.next().await {
            results.push(result);
        }
        results
    }
}
