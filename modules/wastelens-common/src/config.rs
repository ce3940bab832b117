use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::error::WastelensError;
use crate::types::PromptVariant;

/// What to do when the uploaded object cannot be deleted after a successful
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPolicy {
    /// Return the result and surface the failure as a warning.
    #[default]
    Lenient,
    /// Fail the request, discarding the result.
    Strict,
}

impl FromStr for CleanupPolicy {
    type Err = WastelensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(WastelensError::Config(format!(
                "unknown cleanup policy '{other}' (expected lenient or strict)"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub api_host: String,
    pub api_port: u16,
    pub max_upload_bytes: usize,
    pub allowed_origins: Vec<String>,

    // Object storage
    pub gcs_bucket: String,
    pub gcs_base_url: String,
    pub gcloud_key_base64: String,
    pub storage_timeout: Duration,

    // Inference
    pub hf_token: String,
    pub inference_base_url: String,
    pub inference_provider: String,
    pub inference_model: String,
    pub inference_timeout: Duration,
    pub upload_max_tokens: u32,
    pub type_max_tokens: u32,

    // Pipeline
    pub prompt_variant: PromptVariant,
    pub cleanup_policy: CleanupPolicy,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} environment variable is required"))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            api_host: or_default("API_HOST", "0.0.0.0"),
            api_port: parse_or(&lookup, "API_PORT", 3000)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            allowed_origins: or_default("ALLOWED_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            gcs_bucket: or_default("GCS_BUCKET", "waste-management-photos"),
            gcs_base_url: or_default("GCS_BASE_URL", "https://storage.googleapis.com"),
            gcloud_key_base64: required("GCLOUD_KEY_BASE64")?,
            storage_timeout: Duration::from_secs(parse_or(&lookup, "STORAGE_TIMEOUT_SECS", 30)?),
            hf_token: required("HF_TOKEN")?,
            inference_base_url: or_default(
                "INFERENCE_BASE_URL",
                "https://router.huggingface.co/v1",
            ),
            inference_provider: or_default("INFERENCE_PROVIDER", "nebius"),
            inference_model: or_default("INFERENCE_MODEL", "google/gemma-3-27b-it"),
            inference_timeout: Duration::from_secs(parse_or(
                &lookup,
                "INFERENCE_TIMEOUT_SECS",
                60,
            )?),
            upload_max_tokens: parse_or(&lookup, "UPLOAD_MAX_TOKENS", 500)?,
            type_max_tokens: parse_or(&lookup, "TYPE_MAX_TOKENS", 100)?,
            prompt_variant: parse_or(&lookup, "PROMPT_VARIANT", PromptVariant::default())?,
            cleanup_policy: parse_or(&lookup, "CLEANUP_POLICY", CleanupPolicy::default())?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[("HF_TOKEN", "hf_abc"), ("GCLOUD_KEY_BASE64", "e30=")];

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = Config::from_lookup(env(REQUIRED)).unwrap();
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.gcs_bucket, "waste-management-photos");
        assert_eq!(config.inference_provider, "nebius");
        assert_eq!(config.inference_model, "google/gemma-3-27b-it");
        assert_eq!(config.upload_max_tokens, 500);
        assert_eq!(config.type_max_tokens, 100);
        assert_eq!(config.allowed_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(config.prompt_variant, PromptVariant::ThreeCategory);
        assert_eq!(config.cleanup_policy, CleanupPolicy::Lenient);
        assert_eq!(config.storage_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = Config::from_lookup(env(&[("GCLOUD_KEY_BASE64", "e30=")])).unwrap_err();
        assert!(err.to_string().contains("HF_TOKEN"));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let err = Config::from_lookup(env(&[("HF_TOKEN", "x"), ("GCLOUD_KEY_BASE64", "  ")]))
            .unwrap_err();
        assert!(err.to_string().contains("GCLOUD_KEY_BASE64"));
    }

    #[test]
    fn allowed_origins_are_split_and_trimmed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push((
            "ALLOWED_ORIGINS",
            "https://app.example.org, http://localhost:5173,,",
        ));
        let config = Config::from_lookup(env(&pairs)).unwrap();
        assert_eq!(
            config.allowed_origins,
            vec![
                "https://app.example.org".to_string(),
                "http://localhost:5173".to_string()
            ]
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PROMPT_VARIANT", "four-category"),
            ("CLEANUP_POLICY", "strict"),
            ("API_PORT", "8080"),
            ("INFERENCE_TIMEOUT_SECS", "5"),
        ]);
        let config = Config::from_lookup(env(&pairs)).unwrap();
        assert_eq!(config.prompt_variant, PromptVariant::FourCategory);
        assert_eq!(config.cleanup_policy, CleanupPolicy::Strict);
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.inference_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("API_PORT", "eighty"));
        let err = Config::from_lookup(env(&pairs)).unwrap_err();
        assert!(format!("{err:#}").contains("API_PORT"));
    }
}
