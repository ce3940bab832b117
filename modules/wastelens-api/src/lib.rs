use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use wastelens_pipeline::Orchestrator;

pub mod error;
pub mod rest;

pub use error::ApiError;

pub struct AppState {
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Router limits and CORS policy.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Exact-match origins. Empty allows no cross-origin access.
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

pub fn build_router(state: Arc<AppState>, options: &RouterOptions) -> Router {
    let origins: Vec<HeaderValue> = options
        .allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([header::HeaderName::from_static(rest::WARNING_HEADER)]);

    Router::new()
        .route("/health", get(rest::health))
        .route("/upload", post(rest::api_upload))
        .route("/type", post(rest::api_type))
        .with_state(state)
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(cors)
        // Uploaded images are transient; nothing should be cached.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // method + path only
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
