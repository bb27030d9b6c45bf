#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Schema(String),

    #[error("{0}")]
    Format(String),

    #[error("connect to {0} timed out after {1} ms")]
    Timeout(String, u64),

    #[error("connect to {0} failed: {1}")]
    Connection(String, std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
