//! Layered configuration.
//!
//! Later layers win:
//! 1. built-in defaults
//! 2. the TOML file (`uvmirror.toml` unless `--config` names another)
//! 3. `UVMIRROR_*` environment variables, nested with `__`
//!    (`UVMIRROR_STORAGE__BUCKET=my-bucket`)
//! 4. `ACCESS_KEY_ID` / `ACCESS_KEY_SECRET` for the bucket credentials

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uvmirror_fetch::ClientSettings;
use uvmirror_source::{PythonConfig, ReleaseConfig};
use uvmirror_store::S3Config;

use crate::transfer::TransferPool;

pub const DEFAULT_CONFIG_FILE: &str = "uvmirror.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error(transparent)]
    FigmentError(#[from] figment::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum transfers in flight.
    pub concurrency: usize,
    pub storage:     S3Config,
    pub http:        ClientSettings,
    pub python:      PythonConfig,
    pub uv:          ReleaseConfig,
    pub serve:       ServeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: TransferPool::DEFAULT_CONCURRENCY,
            storage:     S3Config::default(),
            http:        ClientSettings::default(),
            python:      PythonConfig::default(),
            uv:          ReleaseConfig::default(),
            serve:       ServeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub listen: String,
    /// Directory the bucket is mounted at.
    pub root:   PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:9000".to_string(),
            root:   PathBuf::from("/mnt/oss"),
        }
    }
}

impl Config {
    /// The provider stack. A missing file layer is skipped.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("UVMIRROR_").split("__"))
            .merge(
                Env::raw()
                    .only(&["ACCESS_KEY_ID", "ACCESS_KEY_SECRET"])
                    .map(|key| {
                        if key == "ACCESS_KEY_ID" {
                            "storage.access_key_id".into()
                        } else {
                            "storage.secret_access_key".into()
                        }
                    }),
            )
    }

    /// Load the configuration. An explicitly named file must exist; the
    /// default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) if !p.exists() => return Err(ConfigError::Missing(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Ok(Self::figment(&path).extract()?)
    }
}
