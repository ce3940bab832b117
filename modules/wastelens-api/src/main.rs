use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::HuggingFace;
use gcs_client::{GcsClient, ServiceAccountKey};
use wastelens_api::{build_router, AppState, RouterOptions};
use wastelens_common::Config;
use wastelens_pipeline::{GcsBlobStore, HfClassifier, Orchestrator, PipelineSettings};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("wastelens=info".parse()?);
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = Config::from_env()?;

    let credentials = ServiceAccountKey::from_base64(&config.gcloud_key_base64)
        .context("GCLOUD_KEY_BASE64 is not a valid service-account key")?;
    let gcs = GcsClient::new(&config.gcs_bucket, Some(credentials), config.storage_timeout)?
        .with_base_url(&config.gcs_base_url)?;

    let ai = HuggingFace::new(&config.hf_token, &config.inference_model)
        .with_provider(&config.inference_provider)
        .with_base_url(&config.inference_base_url)
        .with_timeout(config.inference_timeout);

    let orchestrator = Orchestrator::new(
        Arc::new(GcsBlobStore::new(gcs)),
        Arc::new(HfClassifier::new(ai)),
        PipelineSettings::from(&config),
    );
    let state = Arc::new(AppState::new(orchestrator));

    let app = build_router(
        state,
        &RouterOptions {
            allowed_origins: config.allowed_origins.clone(),
            max_upload_bytes: config.max_upload_bytes,
        },
    );

    info!(
        bucket = %config.gcs_bucket,
        model = %config.inference_model,
        provider = %config.inference_provider,
        variant = ?config.prompt_variant,
        cleanup = ?config.cleanup_policy,
        "Pipeline configured"
    );

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("Wastelens API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
