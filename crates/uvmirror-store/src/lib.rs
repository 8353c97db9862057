//! Object storage for the mirror bucket.
//!
//! The mirror only needs three operations from a bucket: list every key, put
//! one object, and delete a batch of keys. [`ObjectStore`] captures exactly
//! that, so reconciliation can run against [`MemoryStore`] in tests and
//! against an S3-compatible service ([`S3Store`]) in production.

mod error;
mod memory;
#[cfg(feature = "s3")]
mod s3;

use std::future::Future;

use bytes::Bytes;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "s3")]
pub use s3::{S3Config, S3Store};

/// Minimal bucket contract.
///
/// Implementations must be safe to share across concurrent transfers.
pub trait ObjectStore: Send + Sync + 'static {
    /// List every key, optionally restricted to `prefix`. Pagination is
    /// handled internally; the caller sees one flattened sequence.
    fn list_keys(&self, prefix: Option<&str>) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Store `body` under `key`, replacing any existing object.
    fn put(&self, key: &str, body: Bytes) -> impl Future<Output = Result<()>> + Send;

    /// Delete `keys` in one logical call. All-or-nothing from the caller's
    /// point of view: any rejected key fails the call.
    fn batch_delete(&self, keys: &[String]) -> impl Future<Output = Result<()>> + Send;
}
