pub mod auth;
pub mod error;

pub use auth::ServiceAccountKey;
pub use error::{GcsError, Result};

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use auth::TokenSource;

pub const GCS_BASE_URL: &str = "https://storage.googleapis.com";

/// Metadata returned by a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectMetadata {
    pub name: String,
    pub bucket: String,
    #[serde(rename = "contentType", default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Client bound to a single bucket.
///
/// Without credentials requests go out unauthenticated, which is what local
/// storage emulators expect.
pub struct GcsClient {
    client: reqwest::Client,
    base_url: Url,
    bucket: String,
    tokens: Option<TokenSource>,
}

impl GcsClient {
    pub fn new(
        bucket: &str,
        credentials: Option<ServiceAccountKey>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(GCS_BASE_URL)?,
            bucket: bucket.to_string(),
            tokens: credentials.map(TokenSource::new),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Publicly fetchable URL for an object. Pure string derivation.
    pub fn public_url(&self, key: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.bucket).extend(key.split('/'));
        }
        url.to_string()
    }

    fn upload_url(&self, key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["upload", "storage", "v1", "b", self.bucket.as_str(), "o"]);
        }
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        url
    }

    fn object_url(&self, key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "b", self.bucket.as_str(), "o"])
                .push(key);
        }
        url
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match self.tokens {
            Some(ref tokens) => Ok(request.bearer_auth(tokens.token(&self.client).await?)),
            None => Ok(request),
        }
    }

    /// Single-request media upload. An existing object with the same name is replaced.
    pub async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<ObjectMetadata> {
        let url = self.upload_url(key);

        debug!(bucket = %self.bucket, key, bytes = data.len(), "GCS upload");

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(data);
        let resp = self.authorize(request).await?.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GcsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// Delete an object. A missing object counts as deleted.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let url = self.object_url(key);

        debug!(bucket = %self.bucket, key, "GCS delete");

        let request = self.client.delete(url);
        let resp = self.authorize(request).await?.send().await?;

        let status = resp.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let message = resp.text().await.unwrap_or_default();
        Err(GcsError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(GcsError::Url(format!("{raw} cannot be used as a base URL")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GcsClient {
        GcsClient::new("waste-management-photos", None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn public_url_joins_bucket_and_key() {
        assert_eq!(
            client().public_url("bottle.jpg"),
            "https://storage.googleapis.com/waste-management-photos/bottle.jpg"
        );
    }

    #[test]
    fn public_url_encodes_key_segments() {
        assert_eq!(
            client().public_url("uploads/my photo#1.jpg"),
            "https://storage.googleapis.com/waste-management-photos/uploads/my%20photo%231.jpg"
        );
    }

    #[test]
    fn public_url_respects_emulator_base() {
        let client = client().with_base_url("http://localhost:4443/").unwrap();
        assert_eq!(
            client.public_url("a.png"),
            "http://localhost:4443/waste-management-photos/a.png"
        );
    }

    #[test]
    fn upload_url_carries_name_as_query() {
        let url = client().upload_url("uploads/can.png");
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/upload/storage/v1/b/waste-management-photos/o?uploadType=media&name=uploads%2Fcan.png"
        );
    }

    #[test]
    fn object_url_encodes_slashes_in_key() {
        let url = client().object_url("uploads/can.png");
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/waste-management-photos/o/uploads%2Fcan.png"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        assert!(client().with_base_url("mailto:ops@example.org").is_err());
    }
}
