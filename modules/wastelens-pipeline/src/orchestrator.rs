//! Upload → classify → extract → cleanup, one run per request.
//!
//! A run owns the object it uploads. Stages advance strictly in order:
//! `Received → Stored → Classified → Extracted → Cleaned → Done`, and the first
//! failure aborts the rest. When classification or extraction fails the
//! uploaded object is left in the store (logged with its key for reaping).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use ai_client::truncate_to_char_boundary;
use wastelens_common::{
    ClassificationQuery, ClassificationResult, CleanupPolicy, Config, PromptVariant,
    RawModelReply, TypeLabel, UploadRequest,
};

use crate::extractor::{ExtractError, FencedJsonExtractor, ReplyExtractor};
use crate::prompt;
use crate::traits::{BlobStore, Classifier};

/// Longest reply excerpt written to logs when extraction fails.
const REPLY_LOG_EXCERPT_BYTES: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Stored,
    Classified,
    Extracted,
    Cleaned,
    Done,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage write failed: {0:#}")]
    StorageWrite(anyhow::Error),

    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("storage delete failed: {0:#}")]
    StorageDelete(anyhow::Error),
}

impl PipelineError {
    /// The stage the run was trying to reach when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidInput(_) => Stage::Received,
            Self::StorageWrite(_) => Stage::Stored,
            Self::Inference(_) => Stage::Classified,
            Self::Extract(_) => Stage::Extracted,
            Self::StorageDelete(_) => Stage::Cleaned,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub variant: PromptVariant,
    pub cleanup_policy: CleanupPolicy,
    pub upload_max_tokens: u32,
    pub type_max_tokens: u32,
    pub storage_timeout: Duration,
    pub inference_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            variant: PromptVariant::default(),
            cleanup_policy: CleanupPolicy::default(),
            upload_max_tokens: 500,
            type_max_tokens: 100,
            storage_timeout: Duration::from_secs(30),
            inference_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            variant: config.prompt_variant,
            cleanup_policy: config.cleanup_policy,
            upload_max_tokens: config.upload_max_tokens,
            type_max_tokens: config.type_max_tokens,
            storage_timeout: config.storage_timeout,
            inference_timeout: config.inference_timeout,
        }
    }
}

/// A successful upload run. `warnings` carries non-fatal cleanup failures.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub result: ClassificationResult,
    pub warnings: Vec<String>,
}

pub struct Orchestrator {
    store: Arc<dyn BlobStore>,
    classifier: Arc<dyn Classifier>,
    extractor: Arc<dyn ReplyExtractor>,
    settings: PipelineSettings,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn BlobStore>,
        classifier: Arc<dyn Classifier>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            classifier,
            extractor: Arc::new(FencedJsonExtractor::new(settings.variant)),
            settings,
        }
    }

    /// Replace the default fenced-JSON extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn ReplyExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Full pipeline for an uploaded image.
    pub async fn classify_upload(
        &self,
        upload: UploadRequest,
    ) -> Result<UploadOutcome, PipelineError> {
        let span = info_span!(
            "classify_upload",
            run_id = %Uuid::new_v4(),
            key = %upload.name,
            bytes = upload.byte_length(),
        );
        self.run_upload(upload).instrument(span).await
    }

    async fn run_upload(&self, upload: UploadRequest) -> Result<UploadOutcome, PipelineError> {
        let mut stage = Stage::Received;

        if upload.name.trim().is_empty() {
            return Err(PipelineError::InvalidInput("file name is empty".into()));
        }
        if upload.byte_length() == 0 {
            return Err(PipelineError::InvalidInput("file is empty".into()));
        }

        let UploadRequest {
            name,
            mime_type,
            bytes,
        } = upload;

        let stored = with_deadline(
            self.settings.storage_timeout,
            self.store.put(&name, bytes, &mime_type),
        )
        .await
        .map_err(|e| fail(stage, PipelineError::StorageWrite(e)))?;
        advance(&mut stage, Stage::Stored);

        let query = ClassificationQuery {
            instruction_text: prompt::classification_instruction(self.settings.variant)
                .to_string(),
            image_url: stored.public_url.clone(),
        };
        let reply = self
            .call_classifier(&query, self.settings.upload_max_tokens)
            .await
            .map_err(|e| {
                warn!(key = %stored.key, "Uploaded object left in store after inference failure");
                fail(stage, e)
            })?;
        advance(&mut stage, Stage::Classified);

        let result = self.extractor.extract_json(&reply).map_err(|e| {
            warn!(
                key = %stored.key,
                reply = truncate_to_char_boundary(&reply.text, REPLY_LOG_EXCERPT_BYTES),
                "Uploaded object left in store after extraction failure"
            );
            fail(stage, e.into())
        })?;
        advance(&mut stage, Stage::Extracted);

        let mut warnings = Vec::new();
        match with_deadline(self.settings.storage_timeout, self.store.delete(&stored.key)).await {
            Ok(()) => advance(&mut stage, Stage::Cleaned),
            Err(e) => match self.settings.cleanup_policy {
                CleanupPolicy::Strict => {
                    return Err(fail(stage, PipelineError::StorageDelete(e)));
                }
                CleanupPolicy::Lenient => {
                    warn!(
                        key = %stored.key,
                        error = %format!("{e:#}"),
                        "Failed to delete uploaded object; returning result"
                    );
                    warnings.push(format!("uploaded image could not be deleted: {e:#}"));
                }
            },
        }

        advance(&mut stage, Stage::Done);
        info!(items = result.prediction.len(), "Classification complete");

        Ok(UploadOutcome { result, warnings })
    }

    /// Lightweight path for an image that is already public: no upload, no cleanup.
    pub async fn classify_type(&self, image_url: &str) -> Result<TypeLabel, PipelineError> {
        let span = info_span!("classify_type", run_id = %Uuid::new_v4());
        async {
            if image_url.trim().is_empty() {
                return Err(PipelineError::InvalidInput("image URL is empty".into()));
            }

            let query = ClassificationQuery {
                instruction_text: prompt::type_instruction(self.settings.variant),
                image_url: image_url.trim().to_string(),
            };
            let reply = self
                .call_classifier(&query, self.settings.type_max_tokens)
                .await
                .map_err(|e| fail(Stage::Received, e))?;

            let label = self
                .extractor
                .extract_type_label(&reply)
                .map_err(|e| fail(Stage::Classified, e.into()))?;

            debug!(label = %label, "Type label extracted");
            Ok::<_, PipelineError>(label)
        }
        .instrument(span)
        .await
    }

    async fn call_classifier(
        &self,
        query: &ClassificationQuery,
        max_output_tokens: u32,
    ) -> Result<RawModelReply, PipelineError> {
        with_deadline(
            self.settings.inference_timeout,
            self.classifier.classify(query, max_output_tokens),
        )
        .await
        .map_err(PipelineError::Inference)
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = ?*stage, to = ?next, "Pipeline stage");
    *stage = next;
}

fn fail(from: Stage, err: PipelineError) -> PipelineError {
    warn!(from = ?from, failed = ?err.stage(), error = %err, "Pipeline failed");
    err
}

async fn with_deadline<T>(
    deadline: Duration,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!("timed out after {}s", deadline.as_secs_f32())),
    }
}
