use thiserror::Error;

pub type Result<T> = std::result::Result<T, GcsError>;

#[derive(Debug, Error)]
pub enum GcsError {
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl From<reqwest::Error> for GcsError {
    fn from(err: reqwest::Error) -> Self {
        GcsError::Network(err.to_string())
    }
}

impl From<url::ParseError> for GcsError {
    fn from(err: url::ParseError) -> Self {
        GcsError::Url(err.to_string())
    }
}
