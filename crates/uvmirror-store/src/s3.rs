use std::fmt;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ObjectStore, Result, StoreError};

/// Connection settings for an S3-compatible bucket.
///
/// Aliyun OSS exposes an S3-compatible API on its regular endpoints, so the
/// defaults point there.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub endpoint:          Option<String>,
    pub region:            String,
    pub bucket:            String,
    pub access_key_id:     Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style:  bool,
    pub list_page_size:    i32,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint:          Some("https://oss-cn-hangzhou.aliyuncs.com".to_string()),
            region:            "cn-hangzhou".to_string(),
            bucket:            "uv-mirror-bucket".to_string(),
            access_key_id:     None,
            secret_access_key: None,
            force_path_style:  false,
            list_page_size:    1000,
        }
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .field("force_path_style", &self.force_path_style)
            .field("list_page_size", &self.list_page_size)
            .finish()
    }
}

pub struct S3Store {
    client:    Client,
    bucket:    String,
    page_size: i32,
}

impl S3Store {
    /// DeleteObjects accepts at most this many keys per request.
    const MAX_DELETE_BATCH: usize = 1000;

    /// Build a client from `cfg`. Static credentials win; without them the
    /// default AWS provider chain (env, profile, IMDS) is used.
    pub async fn connect(cfg: &S3Config) -> Result<Self> {
        if cfg.bucket.is_empty() {
            return Err(StoreError::Client("bucket name is empty".to_string()));
        }

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .load()
            .await;

        let mut b = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &cfg.endpoint {
            b = b.endpoint_url(endpoint);
        }
        if cfg.force_path_style {
            b = b.force_path_style(true);
        }
        if let (Some(ak), Some(sk)) = (&cfg.access_key_id, &cfg.secret_access_key) {
            b = b.credentials_provider(Credentials::new(ak, sk, None, None, "uvmirror"));
        }

        debug!(bucket = %cfg.bucket, endpoint = ?cfg.endpoint, region = %cfg.region, "S3 client configured");

        Ok(Self {
            client:    Client::from_conf(b.build()),
            bucket:    cfg.bucket.clone(),
            page_size: cfg.list_page_size.max(1),
        })
    }
}

impl ObjectStore for S3Store {
    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .max_keys(self.page_size)
                .set_prefix(prefix.map(str::to_string))
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| StoreError::List(DisplayErrorContext(&e).to_string()))?;
            pages += 1;

            keys.extend(resp.contents().iter().filter_map(|o| o.key().map(str::to_string)));

            match resp.next_continuation_token() {
                Some(next) if resp.is_truncated().unwrap_or(false) => token = Some(next.to_string()),
                _ => break,
            }
        }

        debug!(bucket = %self.bucket, pages, keys = keys.len(), "listed bucket");
        Ok(keys)
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        let len = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StoreError::Put {
                key:     key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        debug!(key, bytes = len, "object stored");
        Ok(())
    }

    async fn batch_delete(&self, keys: &[String]) -> Result<()> {
        let delete_error = |message: String| StoreError::Delete {
            count: keys.len(),
            message,
        };

        for chunk in keys.chunks(Self::MAX_DELETE_BATCH) {
            let objects = chunk
                .iter()
                .map(|k| ObjectIdentifier::builder().key(k).build())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| delete_error(e.to_string()))?;
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| delete_error(e.to_string()))?;

            let resp = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| delete_error(DisplayErrorContext(&e).to_string()))?;

            let rejected: Vec<&str> = resp.errors().iter().filter_map(|e| e.key()).collect();
            if let Some(first) = rejected.first() {
                return Err(delete_error(format!(
                    "{} keys rejected, first: {first}",
                    rejected.len()
                )));
            }
            debug!(keys = chunk.len(), "deleted batch");
        }
        Ok(())
    }
}
