//! Central defaults and environment variable names for mnema.
//!
//! Endpoint thresholds, list maxima, and excerpt ceilings live here so
//! the six pipeline configurations stay consistent with the declared
//! contract.

// ─── Environment variables ─────────────────────────────────────────────────

pub const ENV_GENERATION_BASE_URL: &str = "MNEMA_GENERATION_URL";
pub const ENV_GENERATION_MODEL: &str = "MNEMA_GENERATION_MODEL";
pub const ENV_PERCEPTION_BASE_URL: &str = "MNEMA_PERCEPTION_URL";
pub const ENV_SPEECH_BASE_URL: &str = "MNEMA_SPEECH_URL";
pub const ENV_API_TOKEN: &str = "MNEMA_API_TOKEN";
pub const ENV_BIND_ADDR: &str = "MNEMA_BIND_ADDR";

// ─── Service defaults ──────────────────────────────────────────────────────

pub const GENERATION_URL: &str = "http://localhost:11434";
pub const GENERATION_MODEL: &str = "qwen3:8b";
pub const PERCEPTION_URL: &str = "http://localhost:8600";
pub const SPEECH_URL: &str = "http://localhost:8700";
pub const BIND_ADDR: &str = "0.0.0.0:3400";

/// Generation request timeout in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 300;
/// Perception request timeout in seconds.
pub const PERCEPTION_TIMEOUT_SECS: u64 = 60;
/// Speech request timeout in seconds.
pub const SPEECH_TIMEOUT_SECS: u64 = 60;

// ─── Validation ────────────────────────────────────────────────────────────

/// Minimum query length for query/search endpoints.
pub const MIN_QUERY_CHARS: usize = 3;

// ─── Relevance thresholds ──────────────────────────────────────────────────

/// Inclusion threshold for semantic search results.
pub const SEMANTIC_SEARCH_THRESHOLD: f32 = 0.7;
/// Inclusion threshold for vector search results.
pub const VECTOR_SEARCH_THRESHOLD: f32 = 0.3;
/// Floor applied to model-declared confidence (suggestions, analysis).
pub const CONFIDENCE_FLOOR: f32 = 0.5;

// ─── Result-size bounds ────────────────────────────────────────────────────

/// Maximum search results per request (semantic and vector).
pub const MAX_SEARCH_RESULTS: usize = 20;
/// Maximum source names returned by the query endpoint.
pub const MAX_QUERY_SOURCES: usize = 5;
/// Maximum generated suggestions.
pub const MAX_SUGGESTIONS: usize = 5;
/// Maximum keywords in content analysis.
pub const MAX_KEYWORDS: usize = 5;
/// Maximum topics in content analysis.
pub const MAX_TOPICS: usize = 3;
/// Maximum objects in image analysis.
pub const MAX_IMAGE_OBJECTS: usize = 10;
/// Maximum suggestions in image analysis.
pub const MAX_IMAGE_SUGGESTIONS: usize = 3;

// ─── Truncation ceilings ───────────────────────────────────────────────────

/// Maximum snippet length in characters.
pub const SNIPPET_MAX_CHARS: usize = 200;
/// Excerpt ceiling for similarity-scoring prompts.
pub const SCORING_EXCERPT_CHARS: usize = 1000;
/// Excerpt ceiling for analysis/suggestion prompts.
pub const ANALYSIS_EXCERPT_CHARS: usize = 2500;
/// Per-source excerpt ceiling for query-answering prompts.
pub const QUERY_SOURCE_EXCERPT_CHARS: usize = 2000;
