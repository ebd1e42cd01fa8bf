use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("no article with guid {0}")]
    NotFound(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("store file {0} is corrupt and no usable backup exists")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum ExpiryError {
    #[error("expiry task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum TitleError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("title lookup timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("save task ended without reporting")]
    Dropped,
}
