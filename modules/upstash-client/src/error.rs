use thiserror::Error;

pub type Result<T> = std::result::Result<T, UpstashError>;

#[derive(Debug, Error)]
pub enum UpstashError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for UpstashError {
    fn from(err: reqwest::Error) -> Self {
        UpstashError::Network(err.to_string())
    }
}
