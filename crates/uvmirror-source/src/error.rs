use thiserror::Error;
use uvmirror_fetch::FetchError;
use uvmirror_verify::VerificationError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to fetch manifest: {0}")]
    Fetch(#[from] FetchError),

    #[error("unknown URL shape, no recognized upstream prefix: {0}")]
    UnknownUrlShape(String),

    #[error("URL path does not percent-decode to UTF-8: {url}")]
    InvalidKeyEncoding { url: String },

    #[error("invalid checksum declared for {url}: {source}")]
    InvalidChecksum {
        url:    String,
        #[source]
        source: VerificationError,
    },

    #[error("setting `{0}` must not be empty")]
    EmptySetting(&'static str),

    #[error("invalid key pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source:  regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, SourceError>;
