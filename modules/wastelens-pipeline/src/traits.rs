// Seams between the orchestrator and the outside world.
//
// BlobStore and Classifier are the two remote services a pipeline run talks
// to. Production adapters live in `adapters`; `testing` has in-memory mocks.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use wastelens_common::{ClassificationQuery, RawModelReply, StoredObjectRef};

// ---------------------------------------------------------------------------
// BlobStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `key`. An existing object with the same key is replaced.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<StoredObjectRef>;

    /// Remove the object. Removing a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Publicly fetchable URL for `key`. No network call.
    fn public_url(&self, key: &str) -> String;
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Send one instruction plus one image reference; return the raw reply text.
    async fn classify(
        &self,
        query: &ClassificationQuery,
        max_output_tokens: u32,
    ) -> Result<RawModelReply>;
}
