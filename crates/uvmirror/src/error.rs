use thiserror::Error;
use uvmirror_fetch::FetchError;
use uvmirror_source::SourceError;
use uvmirror_store::StoreError;
use uvmirror_verify::{Checksum, VerificationError};

/// Failures that stop a run before any write happens.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("manifest unavailable: {0}")]
    Manifest(#[from] SourceError),

    #[error("bucket inventory unavailable: {0}")]
    Inventory(#[source] StoreError),
}

/// Why one artifact was not mirrored. Never fatal to the run.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("checksum lookup failed: {0}")]
    ChecksumLookup(#[source] FetchError),

    #[error("checksum sidecar {url} is malformed: {source}")]
    InvalidSidecar {
        url:    String,
        #[source]
        source: VerificationError,
    },

    #[error("download failed: {0}")]
    Download(#[source] FetchError),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: Checksum, actual: Checksum },

    #[error("upload failed: {0}")]
    Upload(#[source] StoreError),

    #[error("transfer task aborted: {0}")]
    Aborted(String),
}

/// The stale-key batch delete was rejected.
#[derive(Debug, Error)]
#[error("batch delete failed: {0}")]
pub struct DeleteError(#[from] pub StoreError);
