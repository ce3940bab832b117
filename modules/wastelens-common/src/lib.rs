pub mod config;
pub mod error;
pub mod types;

pub use config::{CleanupPolicy, Config};
pub use error::WastelensError;
pub use types::*;
