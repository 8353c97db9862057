//! A tool's GitHub release assets.
//!
//! Assets are mirrored under their own file names. Checksums live in
//! `<asset>.sha256` sidecars, which are resolved lazily by the transfer step
//! rather than here.

use serde::{Deserialize, Serialize};
use tracing::info;
use uvmirror_fetch::{FetchOptions, Fetcher, HttpClient};

use crate::{ArtifactRef, ChecksumSource, ManifestSource, Result, SourceError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub assets:   Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name:                 String,
    pub browser_download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub releases_url:    String,
    /// Only assets whose names start with this prefix are mirrored. Bucket
    /// keys with this prefix belong to this source.
    pub asset_prefix:    String,
    pub checksum_suffix: String,
    /// Environment variable holding an optional API bearer token.
    pub token_env:       String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            releases_url:    "https://api.github.com/repos/astral-sh/uv/releases/latest".to_string(),
            asset_prefix:    "uv-".to_string(),
            checksum_suffix: ".sha256".to_string(),
            token_env:       "GITHUB_TOKEN".to_string(),
        }
    }
}

pub struct GithubRelease {
    config: ReleaseConfig,
    token:  Option<String>,
}

impl GithubRelease {
    /// Build the source, reading the bearer token from `config.token_env`.
    /// A missing or empty variable means unauthenticated requests.
    ///
    /// An empty asset prefix would claim every key in the bucket and an empty
    /// checksum suffix would skip every asset, so both are rejected.
    pub fn new(config: ReleaseConfig) -> Result<Self> {
        if config.asset_prefix.is_empty() {
            return Err(SourceError::EmptySetting("uv.asset_prefix"));
        }
        if config.checksum_suffix.is_empty() {
            return Err(SourceError::EmptySetting("uv.checksum_suffix"));
        }
        let token = std::env::var(&config.token_env).ok().filter(|t| !t.is_empty());
        Ok(Self { config, token })
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn api_options(&self) -> FetchOptions {
        let options = FetchOptions::default()
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => options.bearer_auth(token),
            None => options,
        }
    }
}

impl ManifestSource for GithubRelease {
    type Entry = ReleaseAsset;

    fn name(&self) -> &str { "uv" }

    async fn fetch_manifest<C: HttpClient>(&self, fetcher: &Fetcher<C>) -> Result<Vec<ReleaseAsset>> {
        if self.token.is_none() {
            info!(env = %self.config.token_env, "no API token set, using unauthenticated requests");
        }
        let release: Release = fetcher
            .fetch_json(&self.config.releases_url, &self.api_options())
            .await?;
        info!(
            tag = release.tag_name.as_deref().unwrap_or("<untagged>"),
            assets = release.assets.len(),
            "fetched release"
        );
        Ok(release.assets)
    }

    fn select(&self, asset: &ReleaseAsset) -> Result<Option<ArtifactRef>> {
        if !asset.name.starts_with(self.config.asset_prefix.as_str())
            || asset.name.ends_with(self.config.checksum_suffix.as_str())
        {
            return Ok(None);
        }

        let sidecar = format!("{}{}", asset.browser_download_url, self.config.checksum_suffix);
        Ok(Some(
            ArtifactRef::new(asset.name.clone(), asset.browser_download_url.clone())
                .checksum(ChecksumSource::Sidecar(sidecar)),
        ))
    }

    fn owns(&self, key: &str) -> bool { key.starts_with(self.config.asset_prefix.as_str()) }
}

#[cfg(test)]
mod tests {
    use uvmirror_fetch::MockHttpClient;

    use super::*;

    const DOWNLOAD: &str = "https://github.com/astral-sh/uv/releases/download/0.4.24/";

    fn asset(name: &str) -> ReleaseAsset {
        ReleaseAsset {
            name:                 name.to_string(),
            browser_download_url: format!("{DOWNLOAD}{name}"),
        }
    }

    fn source() -> GithubRelease { GithubRelease::new(ReleaseConfig::default()).unwrap().with_token(None) }

    #[test]
    fn selects_tool_archives_with_sidecar() {
        let artifact = source()
            .select(&asset("uv-x86_64-unknown-linux-gnu.tar.gz"))
            .unwrap()
            .unwrap();

        assert_eq!(artifact.key, "uv-x86_64-unknown-linux-gnu.tar.gz");
        assert_eq!(
            artifact.checksum,
            ChecksumSource::Sidecar(format!("{DOWNLOAD}uv-x86_64-unknown-linux-gnu.tar.gz.sha256"))
        );
    }

    #[test]
    fn skips_checksum_files_and_foreign_assets() {
        let s = source();
        assert_eq!(s.select(&asset("uv-x86_64-unknown-linux-gnu.tar.gz.sha256")).unwrap(), None);
        assert_eq!(s.select(&asset("sha256.sum")).unwrap(), None);
        assert_eq!(s.select(&asset("dist-manifest.json")).unwrap(), None);
    }

    #[test]
    fn owns_prefixed_keys() {
        let s = source();
        assert!(s.owns("uv-aarch64-apple-darwin.tar.gz"));
        assert!(!s.owns("pypy3.10-v7.3.17-linux64.tar.bz2"));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let config = ReleaseConfig {
            asset_prefix: String::new(),
            ..ReleaseConfig::default()
        };
        assert!(matches!(
            GithubRelease::new(config),
            Err(SourceError::EmptySetting("uv.asset_prefix"))
        ));
    }

    #[test]
    fn empty_suffix_is_rejected() {
        let config = ReleaseConfig {
            checksum_suffix: String::new(),
            ..ReleaseConfig::default()
        };
        assert!(matches!(
            GithubRelease::new(config),
            Err(SourceError::EmptySetting("uv.checksum_suffix"))
        ));
    }

    #[tokio::test]
    async fn fetch_manifest_sends_token_when_present() {
        let config = ReleaseConfig::default();
        let body = serde_json::json!({
            "tag_name": "0.4.24",
            "assets": [
                { "name": "uv-x86_64-unknown-linux-gnu.tar.gz", "browser_download_url": format!("{DOWNLOAD}uv-x86_64-unknown-linux-gnu.tar.gz"), "size": 1 },
                { "name": "uv-x86_64-unknown-linux-gnu.tar.gz.sha256", "browser_download_url": format!("{DOWNLOAD}uv-x86_64-unknown-linux-gnu.tar.gz.sha256") }
            ]
        });
        let client = MockHttpClient::new().route(config.releases_url.clone(), 200, body.to_string());
        let fetcher = Fetcher::new(client);
        let source = GithubRelease::new(config.clone()).unwrap().with_token(Some("ghp_test".into()));

        let assets = source.fetch_manifest(&fetcher).await.unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(source.select_all(&assets).unwrap().len(), 1);
        let request = &fetcher.client().requests()[0];
        assert!(
            request
                .headers
                .contains(&("Authorization".to_string(), "Bearer ghp_test".to_string()))
        );
    }

    #[tokio::test]
    async fn fetch_manifest_without_token_is_unauthenticated() {
        let config = ReleaseConfig::default();
        let client = MockHttpClient::new().route(config.releases_url.clone(), 200, r#"{"assets":[]}"#);
        let fetcher = Fetcher::new(client);

        let assets = source().fetch_manifest(&fetcher).await.unwrap();

        assert!(assets.is_empty());
        let request = &fetcher.client().requests()[0];
        assert!(request.headers.iter().all(|(k, _)| k != "Authorization"));
    }
}
