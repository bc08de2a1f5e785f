//! Domain models for the content intelligence pipeline.
//!
//! Everything here is created and discarded within a single request.
//! Persistence belongs to the metadata-store collaborator; this
//! subsystem never caches across requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SCOPE & CONTENT RECORDS
// =============================================================================

/// Identifies a user-owned knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeHandle {
    pub owner_id: Uuid,
    pub scope_id: Uuid,
}

/// Metadata-store row for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeRecord {
    pub scope_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
}

impl ScopeRecord {
    /// Owner/scope pair identifying this knowledge base.
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            owner_id: self.owner_id,
            scope_id: self.scope_id,
        }
    }
}

/// Broad content category derived from the stored MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MimeCategory {
    Document,
    Image,
    Audio,
    Other,
}

impl MimeCategory {
    /// Classify a MIME type string into a category.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else if mime.starts_with("text/")
            || mime == "application/json"
            || mime == "application/pdf"
            || mime == "application/markdown"
        {
            Self::Document
        } else {
            Self::Other
        }
    }
}

/// Metadata-store row for one content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: Uuid,
    pub scope_id: Uuid,
    pub owner_id: Uuid,
    pub display_name: String,
    pub mime_category: MimeCategory,
    /// Key under which the raw bytes live in object storage.
    pub storage_key: String,
    /// Stored embedding, if one has been produced for this item.
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CANDIDATES
// =============================================================================

/// Raw body of a gathered candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateBody {
    Text(String),
    Bytes(Vec<u8>),
}

/// A content item considered for relevance scoring in one request.
#[derive(Debug, Clone)]
pub struct ContentCandidate {
    pub id: Uuid,
    pub scope_id: Uuid,
    pub owner_id: Uuid,
    pub display_name: String,
    pub mime_category: MimeCategory,
    pub body: CandidateBody,
    pub embedding: Option<Vec<f32>>,
}

impl ContentCandidate {
    /// Text body, if this candidate carries text.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            CandidateBody::Text(t) => Some(t),
            CandidateBody::Bytes(_) => None,
        }
    }

    /// Raw bytes, if this candidate carries binary media.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.body {
            CandidateBody::Bytes(b) => Some(b),
            CandidateBody::Text(_) => None,
        }
    }
}

/// One scored candidate in a ranked result list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceResult {
    pub candidate_id: Uuid,
    pub display_name: String,
    /// Always within [0, 1].
    pub score: f32,
    /// At most 200 characters of candidate text.
    pub snippet: String,
}

// =============================================================================
// PROMPTS & MODEL REPLIES
// =============================================================================

/// A fully assembled model prompt. Immutable once built; excerpts are
/// truncated before assembly, never after.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrompt {
    pub instruction: String,
    pub excerpts: Vec<String>,
    pub output_schema: String,
}

impl ModelPrompt {
    /// Render the prompt into the single text block sent to the model.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.instruction.len()
                + self.output_schema.len()
                + self.excerpts.iter().map(|e| e.len() + 16).sum::<usize>()
                + 64,
        );
        out.push_str(&self.instruction);
        for (i, excerpt) in self.excerpts.iter().enumerate() {
            out.push_str(&format!("\n\n--- Content {} ---\n", i + 1));
            out.push_str(excerpt);
        }
        out.push_str("\n\n");
        out.push_str(&self.output_schema);
        out
    }
}

/// Tagged result of parsing model output. The raw text is never
/// trusted directly; every field goes through validation/coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Parsed(serde_json::Value),
    Unparseable { raw: String, reason: String },
}

impl ModelReply {
    pub fn as_parsed(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Parsed(v) => Some(v),
            Self::Unparseable { .. } => None,
        }
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Caller identity resolved by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub caller_id: Uuid,
}

// =============================================================================
// PERCEPTION
// =============================================================================

/// A label detected in an image, with the service's confidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedLabel {
    pub name: String,
    pub confidence: f32,
}

// =============================================================================
// TRANSCRIPTION
// =============================================================================

/// State of an asynchronous transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranscriptionStatus {
    InProgress,
    Completed,
    Failed,
}

/// One speaker-attributed segment of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerSegment {
    pub speaker: String,
    pub text: String,
}

/// Finished transcript payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptPayload {
    pub transcript: String,
    pub confidence: f32,
    pub speakers: Vec<SpeakerSegment>,
    /// Audio duration in seconds.
    pub duration: f64,
    /// ISO 639-1 language code.
    pub language: String,
}

/// Handle plus current state of a transcription job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionJob {
    pub job_id: String,
    pub status: TranscriptionStatus,
    pub transcript: Option<TranscriptPayload>,
}

// =============================================================================
// NORMALIZED RESULTS (endpoint payloads)
// =============================================================================

/// Answer produced by the query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryAnswer {
    pub response: String,
    /// Display names of the top-ranked source items, at most 5.
    pub sources: Vec<String>,
}

/// Sentiment classification for content analysis. Out-of-enum model
/// output is coerced to `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parse a model-declared sentiment, coercing anything unknown to
    /// `Neutral`.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

/// Suggestion category. Out-of-enum model output is coerced to
/// `RelatedContent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    RelatedContent,
    Improvement,
    ActionItem,
}

impl SuggestionType {
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "improvement" => Self::Improvement,
            "action_item" => Self::ActionItem,
            _ => Self::RelatedContent,
        }
    }
}

/// One generated suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    pub title: String,
    pub description: String,
    pub confidence: f32,
}

/// Normalized result of content analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentAnalysis {
    pub summary: String,
    /// At most 5.
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
    /// At most 3.
    pub topics: Vec<String>,
}

/// Normalized result of image analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageAnalysis {
    pub description: String,
    /// At most 10.
    pub objects: Vec<String>,
    /// Text detected in the image.
    pub text: String,
    /// Always within [0, 1].
    pub confidence: f32,
    /// At most 3.
    pub suggestions: Vec<String>,
}
