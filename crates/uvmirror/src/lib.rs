//! Keeps an object-storage bucket in sync with uv's upstream downloads.
//!
//! Each run fetches one upstream manifest, works out which artifacts are
//! missing from the bucket and which owned keys have gone stale, transfers
//! the missing ones with checksum verification, and prunes the stale ones.
//! The bucket itself is the only state.
//!
//! ```no_run
//! # async fn sync() -> anyhow::Result<()> {
//! use uvmirror::Mirror;
//! use uvmirror_fetch::{ClientSettings, Fetcher, ReqwestClient};
//! use uvmirror_source::{GithubRelease, ReleaseConfig};
//! use uvmirror_store::{S3Config, S3Store};
//!
//! let client = ReqwestClient::new(&ClientSettings::default())?;
//! let store = S3Store::connect(&S3Config::default()).await?;
//! let mirror = Mirror::new(Fetcher::new(client), store).with_concurrency(16);
//!
//! let report = mirror.run(&GithubRelease::new(ReleaseConfig::default())?).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod mirror;
pub mod prune;
pub mod reconcile;
pub mod report;
pub mod serve;
pub mod transfer;

pub use config::{Config, ConfigError, ServeConfig};
pub use error::{DeleteError, MirrorError, TransferError};
pub use mirror::{Mirror, Plan};
pub use reconcile::{Reconciliation, reconcile};
pub use report::Report;
pub use transfer::{TransferPool, TransferResult};
