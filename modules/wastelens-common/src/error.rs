use thiserror::Error;

#[derive(Error, Debug)]
pub enum WastelensError {
    #[error("Configuration error: {0}")]
    Config(String),
}
