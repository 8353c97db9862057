use bytes::BytesMut;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tracing::debug;
use uvmirror_verify::{ChecksumMismatch, Sha256Hasher, Verification};

use crate::core::{is_not_found, is_success};
use crate::data::{FetchOptions, Fetched};
use crate::effects::http::{HttpClient, Response};
use crate::error::{FetchError, Result};

/// Downloads bodies into memory, hashing them as they stream in.
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self { Self { client } }

    pub fn client(&self) -> &C { &self.client }

    /// Fetch `url` and return its body. Any non-2xx status is an error.
    ///
    /// When `options.checksum` is set the body must hash to it, otherwise the
    /// call fails with [`FetchError::ChecksumMismatch`] and the bytes are
    /// dropped.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Fetched> {
        let response = self.open(url, options).await?;
        if !is_success(response.status) {
            return Err(FetchError::Status {
                url:    url.to_string(),
                status: response.status,
            });
        }
        self.read_body(url, response, options).await
    }

    /// Like [`fetch`](Self::fetch), but a 404 yields `Ok(None)`.
    pub async fn fetch_optional(&self, url: &str, options: &FetchOptions) -> Result<Option<Fetched>> {
        let response = self.open(url, options).await?;
        if is_not_found(response.status) {
            debug!(url, "resource not found");
            return Ok(None);
        }
        if !is_success(response.status) {
            return Err(FetchError::Status {
                url:    url.to_string(),
                status: response.status,
            });
        }
        self.read_body(url, response, options).await.map(Some)
    }

    /// Fetch `url` and decode the body as JSON.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str, options: &FetchOptions) -> Result<T> {
        let fetched = self.fetch(url, options).await?;
        serde_json::from_slice(&fetched.body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn open(&self, url: &str, options: &FetchOptions) -> Result<Response<C::Error>> {
        debug!(url, "GET");
        self.client
            .get(url, &options.headers)
            .await
            .map_err(|e| Self::network_error(url, e))
    }

    async fn read_body(
        &self,
        url: &str,
        mut response: Response<C::Error>,
        options: &FetchOptions,
    ) -> Result<Fetched> {
        let mut verification = Verification::new(Sha256Hasher::new(), options.checksum.clone());
        let mut body = BytesMut::new();

        while let Some(chunk) = response.body.next().await {
            let chunk = chunk.map_err(|e| Self::network_error(url, e))?;
            verification.update(&chunk);
            body.extend_from_slice(&chunk);
        }

        debug!(url, bytes = body.len(), "body received");

        let checksum = verification
            .finish()
            .map_err(|ChecksumMismatch { expected, actual }| FetchError::ChecksumMismatch {
                url: url.to_string(),
                expected,
                actual,
            })?;

        Ok(Fetched {
            body: body.freeze(),
            checksum,
        })
    }

    fn network_error<E: std::error::Error>(url: &str, e: E) -> FetchError {
        FetchError::Network {
            url:     url.to_string(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use uvmirror_verify::Checksum;

    use super::*;
    use crate::effects::MockHttpClient;

    fn sha256(data: &[u8]) -> Checksum { Checksum::sha256(data) }

    #[tokio::test]
    async fn test_fetch_returns_body_and_checksum() {
        let client = MockHttpClient::new().route("http://x/a", 200, b"artifact bytes".to_vec());
        let fetcher = Fetcher::new(client);

        let fetched = fetcher.fetch("http://x/a", &FetchOptions::default()).await.unwrap();

        assert_eq!(&fetched.body[..], b"artifact bytes");
        assert_eq!(fetched.checksum, sha256(b"artifact bytes"));
    }

    #[tokio::test]
    async fn test_fetch_verifies_expected_checksum() {
        let client = MockHttpClient::new().route("http://x/a", 200, b"artifact bytes".to_vec());
        let fetcher = Fetcher::new(client);
        let options = FetchOptions::default().checksum(Some(sha256(b"artifact bytes")));

        assert!(fetcher.fetch("http://x/a", &options).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_checksum_mismatch() {
        let client = MockHttpClient::new().route("http://x/a", 200, b"tampered".to_vec());
        let fetcher = Fetcher::new(client);
        let options = FetchOptions::default().checksum(Some(sha256(b"original")));

        match fetcher.fetch("http://x/a", &options).await {
            Err(FetchError::ChecksumMismatch { expected, actual, .. }) => {
                assert_eq!(expected, sha256(b"original"));
                assert_eq!(actual, sha256(b"tampered"));
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let client = MockHttpClient::new().route("http://x/a", 503, Vec::new());
        let fetcher = Fetcher::new(client);

        let err = fetcher.fetch("http://x/a", &FetchOptions::default()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert_eq!(err.url(), "http://x/a");
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let client = MockHttpClient::new().unreachable("http://x/a");
        let fetcher = Fetcher::new(client);

        let err = fetcher.fetch("http://x/a", &FetchOptions::default()).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }

    #[tokio::test]
    async fn test_fetch_optional_not_found() {
        let fetcher = Fetcher::new(MockHttpClient::new());

        let fetched = fetcher
            .fetch_optional("http://x/a.sha256", &FetchOptions::default())
            .await
            .unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_fetch_optional_other_status_is_error() {
        let client = MockHttpClient::new().route("http://x/a.sha256", 403, Vec::new());
        let fetcher = Fetcher::new(client);

        let err = fetcher
            .fetch_optional("http://x/a.sha256", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_fetch_json_decode_error() {
        let client = MockHttpClient::new().route("http://x/meta.json", 200, b"not json".to_vec());
        let fetcher = Fetcher::new(client);

        let err = fetcher
            .fetch_json::<serde_json::Value>("http://x/meta.json", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_headers_are_forwarded() {
        let client = MockHttpClient::new().route("http://x/a", 200, Vec::new());
        let fetcher = Fetcher::new(client);
        let options = FetchOptions::default().bearer_auth("t0ken");

        fetcher.fetch("http://x/a", &options).await.unwrap();

        let requests = fetcher.client().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://x/a");
        assert!(
            requests[0]
                .headers
                .contains(&("Authorization".to_string(), "Bearer t0ken".to_string()))
        );
    }
}
