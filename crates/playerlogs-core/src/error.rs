use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed cache file: {0}")]
    Malformed(#[from] serde_json::Error),
}
