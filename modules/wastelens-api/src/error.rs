use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use wastelens_pipeline::{ExtractError, PipelineError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no file uploaded")]
    NoFile,

    #[error("no image URL provided")]
    NoImageUrl,

    #[error("multipart body could not be read: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::NoFile => (StatusCode::BAD_REQUEST, ErrorBody::new("No file uploaded")),
            Self::NoImageUrl => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("No image URL provided"),
            ),
            Self::Multipart(e) => (e.status(), ErrorBody::new(e.body_text())),
            Self::Pipeline(e) => pipeline_response(e),
        }
    }
}

fn pipeline_response(err: &PipelineError) -> (StatusCode, ErrorBody) {
    let internal = StatusCode::INTERNAL_SERVER_ERROR;
    match err {
        PipelineError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone())),
        PipelineError::StorageWrite(e) => (
            internal,
            ErrorBody::with_details("Failed to upload image", format!("{e:#}")),
        ),
        PipelineError::Inference(e) => (
            internal,
            ErrorBody::with_details("Failed to process image", format!("{e:#}")),
        ),
        PipelineError::StorageDelete(e) => (
            internal,
            ErrorBody::with_details("Failed to delete uploaded image", format!("{e:#}")),
        ),
        PipelineError::Extract(e) => match e {
            ExtractError::NoJsonBlock => {
                (internal, ErrorBody::new("Model response is not valid JSON."))
            }
            ExtractError::MalformedJson(source) => (
                internal,
                ErrorBody::with_details("Failed to parse JSON from model.", source.to_string()),
            ),
            ExtractError::SchemaMismatch(msg) => (
                internal,
                ErrorBody::with_details(
                    "Model response does not match the expected schema.",
                    msg.clone(),
                ),
            ),
            ExtractError::EmptyReply => {
                (internal, ErrorBody::new("Model returned an empty type label."))
            }
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(body)).into_response()
    }
}
