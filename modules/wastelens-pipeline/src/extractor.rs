//! Turns the model's free-text reply into a validated classification document.
//!
//! The model is asked for bare JSON but routinely wraps it in prose and a
//! markdown fence, so extraction looks for the first ```json fenced block and
//! parses only its body. Anything outside the fence is discarded.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use wastelens_common::{
    ClassificationResult, PromptVariant, RawModelReply, TypeLabel, NOT_APPLICABLE,
};

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").unwrap());

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model reply contains no fenced JSON block")]
    NoJsonBlock,

    #[error("malformed JSON in model reply: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("model reply does not match the classification schema: {0}")]
    SchemaMismatch(String),

    #[error("model returned an empty type label")]
    EmptyReply,
}

pub trait ReplyExtractor: Send + Sync {
    /// Full-detail path: fenced JSON → `ClassificationResult`.
    fn extract_json(&self, reply: &RawModelReply) -> Result<ClassificationResult, ExtractError>;

    /// Lightweight path: trimmed reply text, no parsing.
    fn extract_type_label(&self, reply: &RawModelReply) -> Result<TypeLabel, ExtractError>;
}

/// Regex-based extractor for markdown-fenced JSON replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FencedJsonExtractor {
    variant: PromptVariant,
}

impl FencedJsonExtractor {
    pub fn new(variant: PromptVariant) -> Self {
        Self { variant }
    }

    /// Body of the first fenced JSON block, if any.
    pub fn fenced_body(text: &str) -> Option<&str> {
        FENCED_JSON
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn validate(&self, result: &ClassificationResult) -> Result<(), ExtractError> {
        if result.prediction.is_empty() {
            return Err(ExtractError::SchemaMismatch(
                "\"prediction\" contains no items".to_string(),
            ));
        }

        for (item, prediction) in &result.prediction {
            if item.trim().is_empty() {
                return Err(ExtractError::SchemaMismatch(
                    "item name must not be empty".to_string(),
                ));
            }

            let category = prediction.classification;
            if !self.variant.accepts(category) {
                let allowed: Vec<&str> = self
                    .variant
                    .categories()
                    .iter()
                    .map(|c| c.label())
                    .collect();
                return Err(ExtractError::SchemaMismatch(format!(
                    "'{item}': classification '{category}' is not one of {} or {NOT_APPLICABLE}",
                    allowed.join(", ")
                )));
            }

            // No category means no advice.
            if category.is_not_applicable() {
                if let Some((field, _)) = prediction
                    .general_solution
                    .fields()
                    .into_iter()
                    .find(|(_, value)| *value != NOT_APPLICABLE)
                {
                    return Err(ExtractError::SchemaMismatch(format!(
                        "'{item}': classification is {NOT_APPLICABLE} but general_solution.{field} is not"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl ReplyExtractor for FencedJsonExtractor {
    fn extract_json(&self, reply: &RawModelReply) -> Result<ClassificationResult, ExtractError> {
        let body = Self::fenced_body(&reply.text).ok_or(ExtractError::NoJsonBlock)?;

        // Syntax first, so malformed JSON and wrong-shape JSON stay distinguishable.
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(ExtractError::MalformedJson)?;
        let result: ClassificationResult = serde_json::from_value(value)
            .map_err(|e| ExtractError::SchemaMismatch(e.to_string()))?;

        self.validate(&result)?;
        Ok(result)
    }

    fn extract_type_label(&self, reply: &RawModelReply) -> Result<TypeLabel, ExtractError> {
        let label = reply.text.trim();
        if label.is_empty() {
            return Err(ExtractError::EmptyReply);
        }
        Ok(TypeLabel(label.to_string()))
    }
}
