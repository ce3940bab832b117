// Production implementations of the pipeline traits.
//
// GcsBlobStore → Google Cloud Storage via gcs-client.
// HfClassifier → Hugging Face inference router via ai-client.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use ai_client::HuggingFace;
use gcs_client::GcsClient;
use wastelens_common::{ClassificationQuery, RawModelReply, StoredObjectRef};

use crate::traits::{BlobStore, Classifier};

// ---------------------------------------------------------------------------
// GcsBlobStore
// ---------------------------------------------------------------------------

pub struct GcsBlobStore {
    client: GcsClient,
}

impl GcsBlobStore {
    pub fn new(client: GcsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<StoredObjectRef> {
        let object = self.client.upload(key, bytes, content_type).await?;
        Ok(StoredObjectRef {
            public_url: self.client.public_url(&object.name),
            key: object.name,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        Ok(self.client.delete(key).await?)
    }

    fn public_url(&self, key: &str) -> String {
        self.client.public_url(key)
    }
}

// ---------------------------------------------------------------------------
// HfClassifier
// ---------------------------------------------------------------------------

pub struct HfClassifier {
    ai: HuggingFace,
}

impl HfClassifier {
    pub fn new(ai: HuggingFace) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl Classifier for HfClassifier {
    async fn classify(
        &self,
        query: &ClassificationQuery,
        max_output_tokens: u32,
    ) -> Result<RawModelReply> {
        let text = self
            .ai
            .complete_with_image(&query.instruction_text, &query.image_url, max_output_tokens)
            .await?;
        Ok(RawModelReply::new(text))
    }
}
