// Test mocks for the classification pipeline.
//
// Two mocks matching the two trait boundaries:
// - MockBlobStore (BlobStore): in-memory objects, records every call
// - MockClassifier (Classifier): canned reply or failure, records queries
//
// Plus helpers for building uploads and fenced replies.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::Bytes;

use wastelens_common::{
    ClassificationQuery, ClassificationResult, RawModelReply, StoredObjectRef, UploadRequest,
};

use crate::traits::{BlobStore, Classifier};

pub const TEST_BUCKET_URL: &str = "https://storage.test/bucket";

// ---------------------------------------------------------------------------
// MockBlobStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Bytes,
    pub content_type: String,
}

/// In-memory blob store. Failures are opt-in via `.failing_put()` / `.failing_delete()`.
pub struct MockBlobStore {
    objects: Mutex<HashMap<String, StoredBlob>>,
    put_calls: Mutex<Vec<String>>,
    delete_calls: Mutex<Vec<String>>,
    put_error: Option<String>,
    delete_error: Option<String>,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            put_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            put_error: None,
            delete_error: None,
        }
    }

    pub fn failing_put(mut self, message: &str) -> Self {
        self.put_error = Some(message.to_string());
        self
    }

    pub fn failing_delete(mut self, message: &str) -> Self {
        self.delete_error = Some(message.to_string());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object(&self, key: &str) -> Option<StoredBlob> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn put_calls(&self) -> Vec<String> {
        self.put_calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<StoredObjectRef> {
        self.put_calls.lock().unwrap().push(key.to_string());
        if let Some(ref message) = self.put_error {
            bail!("MockBlobStore: {message}");
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(StoredObjectRef {
            key: key.to_string(),
            public_url: self.public_url(key),
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_calls.lock().unwrap().push(key.to_string());
        if let Some(ref message) = self.delete_error {
            bail!("MockBlobStore: {message}");
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{TEST_BUCKET_URL}/{key}")
    }
}

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

enum Behavior {
    Reply(String),
    Fail(String),
}

/// Classifier returning one canned reply (or error) for every query.
pub struct MockClassifier {
    behavior: Behavior,
    calls: Mutex<Vec<(ClassificationQuery, u32)>>,
}

impl MockClassifier {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Reply(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every `(query, max_output_tokens)` pair seen so far.
    pub fn calls(&self) -> Vec<(ClassificationQuery, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(
        &self,
        query: &ClassificationQuery,
        max_output_tokens: u32,
    ) -> Result<RawModelReply> {
        self.calls
            .lock()
            .unwrap()
            .push((query.clone(), max_output_tokens));
        match self.behavior {
            Behavior::Reply(ref text) => Ok(RawModelReply::new(text.clone())),
            Behavior::Fail(ref message) => bail!("MockClassifier: {message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

pub fn upload(name: &str, bytes: &[u8]) -> UploadRequest {
    UploadRequest {
        name: name.to_string(),
        mime_type: "image/jpeg".to_string(),
        bytes: Bytes::copy_from_slice(bytes),
    }
}

/// Wrap a document the way the model does: prose, then a ```json fence.
pub fn fenced_reply(result: &ClassificationResult) -> String {
    let body = serde_json::to_string_pretty(result).unwrap();
    format!("Here it is:\n```json\n{body}\n```")
}
