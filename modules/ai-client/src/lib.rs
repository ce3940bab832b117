pub mod error;
pub mod huggingface;
pub(crate) mod types;
pub mod util;

pub use error::{AiError, Result};
pub use huggingface::HuggingFace;
pub use util::truncate_to_char_boundary;
