//! In-memory [`HttpClient`] for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;
use thiserror::Error;

use super::http::{BoxStream, HttpClient, Response};

/// Transport failure reported for routes marked [`unreachable`](MockHttpClient::unreachable).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MockError(pub String);

/// A request seen by [`MockHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url:     String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum Route {
    Respond { status: u16, body: Bytes },
    Unreachable,
}

/// Serves canned responses keyed by exact URL. Unknown URLs answer 404.
///
/// Bodies are delivered in small chunks so that streaming code paths are
/// exercised.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes:   HashMap<String, Route>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    const CHUNK: usize = 8192;

    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn route(mut self, url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        self.routes.insert(url.into(), Route::Respond {
            status,
            body: body.into(),
        });
        self
    }

    /// Make `url` fail at the transport level.
    #[must_use]
    pub fn unreachable(mut self, url: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Route::Unreachable);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.url == url).count()
    }
}

impl HttpClient for MockHttpClient {
    type Error = MockError;

    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<Response<Self::Error>, Self::Error> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                url:     url.to_string(),
                headers: headers.to_vec(),
            });
        }

        let (status, body) = match self.routes.get(url) {
            Some(Route::Respond { status, body }) => (*status, body.clone()),
            Some(Route::Unreachable) => return Err(MockError(format!("connection refused: {url}"))),
            None => (404, Bytes::from_static(b"404 Not Found")),
        };

        let chunks: Vec<std::result::Result<Bytes, MockError>> = body
            .chunks(Self::CHUNK)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        let stream: BoxStream<'static, std::result::Result<Bytes, MockError>> =
            Box::pin(futures_util::stream::iter(chunks));

        Ok(Response { status, body: stream })
    }
}
