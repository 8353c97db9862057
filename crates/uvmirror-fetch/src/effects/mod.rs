//! I/O operations for HTTP fetching.

mod fetcher;
mod http;
mod mock;

pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient, Response};
pub use mock::{MockError, MockHttpClient, RecordedRequest};

#[cfg(feature = "reqwest")]
pub use http::{ClientSettingError, ReqwestClient};
