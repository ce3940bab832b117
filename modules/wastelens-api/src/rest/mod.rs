use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::HeaderValue,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use wastelens_common::UploadRequest;

use crate::error::ApiError;
use crate::AppState;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Response header carrying non-fatal pipeline warnings.
pub const WARNING_HEADER: &str = "x-wastelens-warning";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Deserialize)]
pub struct TypeRequest {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn api_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    // Not a multipart body at all: same as no file.
    let mut multipart = multipart.map_err(|_| ApiError::NoFile)?;
    let upload = read_file_field(&mut multipart)
        .await?
        .ok_or(ApiError::NoFile)?;

    info!(name = %upload.name, bytes = upload.byte_length(), "Upload received");

    let outcome = state.orchestrator.classify_upload(upload).await?;

    let mut response = Json(outcome.result).into_response();
    for warning in &outcome.warnings {
        match HeaderValue::from_str(&header_safe(warning)) {
            Ok(value) => {
                response.headers_mut().append(WARNING_HEADER, value);
            }
            Err(e) => warn!(error = %e, "Dropping unrepresentable warning header"),
        }
    }
    Ok(response)
}

pub async fn api_type(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let image_url = serde_json::from_slice::<TypeRequest>(&body)
        .ok()
        .and_then(|req| req.image_url)
        .filter(|url| !url.trim().is_empty())
        .ok_or(ApiError::NoImageUrl)?;

    let label = state.orchestrator.classify_type(&image_url).await?;

    Ok(Json(serde_json::json!({ "type": label })).into_response())
}

/// First non-empty `file` part, or `None` when the form has no usable file.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadRequest>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(name) = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
        else {
            return Ok(None);
        };
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(UploadRequest {
            name,
            mime_type,
            bytes,
        }));
    }
    Ok(None)
}

fn header_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { ' ' })
        .collect()
}
