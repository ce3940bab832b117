pub mod adapters;
pub mod extractor;
pub mod orchestrator;
pub mod prompt;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use adapters::{GcsBlobStore, HfClassifier};
pub use extractor::{ExtractError, FencedJsonExtractor, ReplyExtractor};
pub use orchestrator::{Orchestrator, PipelineError, PipelineSettings, Stage, UploadOutcome};
pub use traits::{BlobStore, Classifier};
