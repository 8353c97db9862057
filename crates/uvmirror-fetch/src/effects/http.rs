use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Status line and streaming body of an HTTP response.
pub struct Response<E> {
    pub status: u16,
    pub body:   BoxStream<'static, std::result::Result<Bytes, E>>,
}

/// Asynchronous HTTP client abstraction.
///
/// This trait provides the minimal interface needed for mirroring. Non-2xx
/// statuses are NOT errors at this layer: callers need to tell a 404 checksum
/// sidecar apart from a broken upstream, so the status is handed back as-is.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - In-memory implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for transport failures (DNS, connect, TLS, reset).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a GET and return the response status with its body as a stream.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = std::result::Result<Response<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use reqwest::{Client, Proxy};
    use thiserror::Error;

    use super::*;
    use crate::data::ClientSettings;

    #[derive(Debug, Error)]
    pub enum ClientSettingError {
        #[error("Invalid proxy URL {url}: {source}")]
        Proxy {
            url:    String,
            #[source]
            source: reqwest::Error,
        },

        #[error("Failed to build client: {0}")]
        Build(#[from] reqwest::Error),
    }

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone)]
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        pub fn new(settings: &ClientSettings) -> Result<Self, ClientSettingError> {
            let mut cb = Client::builder()
                .user_agent(settings.user_agent.as_str())
                .connect_timeout(Duration::from_secs(settings.connect_timeout_secs));

            if let Some(secs) = settings.timeout_secs {
                cb = cb.timeout(Duration::from_secs(secs));
            }

            if let Some(url) = &settings.proxy {
                let proxy = Proxy::all(url.as_str()).map_err(|source| ClientSettingError::Proxy {
                    url: url.clone(),
                    source,
                })?;
                cb = cb.proxy(proxy);
            }

            Ok(Self { client: cb.build()? })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> std::result::Result<Response<Self::Error>, Self::Error> {
            let mut request = self.client.get(url);

            for (key, value) in headers {
                request = request.header(key.as_str(), value.as_str());
            }

            let response = request.send().await?;
            let status = response.status().as_u16();

            Ok(Response {
                status,
                body: Box::pin(response.bytes_stream()),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientSettingError, ReqwestClient};
