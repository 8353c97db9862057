//! HTTP fetching with streaming checksum verification.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and types
//! - [`core`] - Pure transformations
//! - [`effects`] - I/O operations with trait abstraction
//!
//! Bodies are hashed while they stream in, so an artifact is verified by the
//! time its last chunk arrives. Nothing here retries; callers decide what a
//! failure means.

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use data::{ClientSettings, FetchOptions, Fetched};
pub use effects::{BoxStream, Fetcher, HttpClient, MockHttpClient, Response};

#[cfg(feature = "reqwest")]
pub use effects::{ClientSettingError, ReqwestClient};

pub use error::{FetchError, Result};
pub use uvmirror_verify::Checksum;
