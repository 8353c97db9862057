use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage client error: {0}")]
    Client(String),

    #[error("failed to list bucket: {0}")]
    List(String),

    #[error("failed to upload {key}: {message}")]
    Put { key: String, message: String },

    #[error("failed to delete {count} keys: {message}")]
    Delete { count: usize, message: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
