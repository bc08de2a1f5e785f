//! Collaborator traits for the content intelligence pipeline.
//!
//! These traits define the interfaces the pipeline consumes. Concrete
//! implementations live in `mnema-inference` (HTTP backends, in-memory
//! fakes); the API layer injects them per request through an explicit
//! collaborator struct rather than module-level singletons, so tests
//! can substitute fakes freely.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Resolves a bearer token to a caller identity.
///
/// Invalid or expired tokens yield `Error::Unauthorized`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CallerIdentity>;
}

/// Read-only view of the metadata store.
///
/// Content lookups use the bare content id as the primary key; scope
/// membership is enforced by the access guard comparing the record's
/// `scope_id` against the requested scope.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch a scope record, or None if absent.
    async fn get_scope(&self, scope_id: Uuid) -> Result<Option<ScopeRecord>>;

    /// Fetch a content record, or None if absent.
    async fn get_content(&self, content_id: Uuid) -> Result<Option<ContentRecord>>;

    /// List all content records in a scope, recency-descending.
    async fn list_scope_content(&self, scope_id: Uuid) -> Result<Vec<ContentRecord>>;
}

/// Fetches raw bytes for a stored object.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn get_bytes(&self, storage_key: &str) -> Result<Vec<u8>>;
}

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Check if the backend is available.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Perception services for images. Text detection and label detection
/// are independent calls so the pipeline can run them in parallel.
#[async_trait]
pub trait PerceptionBackend: Send + Sync {
    /// Detect lines of text in an image.
    async fn detect_text(&self, image: &[u8]) -> Result<Vec<String>>;

    /// Detect object labels in an image.
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<DetectedLabel>>;

    /// Check if the backend is available.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Asynchronous speech-transcription jobs.
///
/// `start_transcription` may report completion synchronously for short
/// audio; otherwise the returned job is polled via `get_transcription`.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Start a transcription job for the object at `storage_key`.
    async fn start_transcription(&self, storage_key: &str) -> Result<TranscriptionJob>;

    /// Fetch the current state of a transcription job.
    async fn get_transcription(&self, job_id: &str) -> Result<TranscriptionJob>;

    /// Check if the backend is available.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
