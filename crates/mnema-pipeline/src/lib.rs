//! # mnema-pipeline
//!
//! The content intelligence pipeline: gather candidate content under
//! an ownership constraint, score relevance, rank and filter, build a
//! model prompt, invoke an external model, and defensively normalize
//! the reply into a bounded typed result with deterministic fallbacks.
//!
//! Each of the six entry points (query, semantic search, vector
//! search, suggestions, content analysis, image/audio analysis) is a
//! distinct configuration of this one skeleton.

pub mod endpoints;
pub mod gather;
pub mod guard;
pub mod normalize;
pub mod prompt;
pub mod ranking;
pub mod scoring;

use std::sync::Arc;

use mnema_core::{
    GenerationBackend, IdentityProvider, MetadataStore, ObjectStorage, PerceptionBackend,
    SpeechBackend,
};

/// External collaborators injected into every pipeline run.
///
/// Held behind `Arc` so the whole set is cheap to clone per request;
/// nothing here is mutated across requests.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub metadata: Arc<dyn MetadataStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub generation: Arc<dyn GenerationBackend>,
    pub perception: Arc<dyn PerceptionBackend>,
    pub speech: Arc<dyn SpeechBackend>,
}
