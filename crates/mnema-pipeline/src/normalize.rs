//! Response normalization: defensive parsing of model output into
//! bounded, typed results with deterministic fallbacks.
//!
//! Model text is never trusted directly. Parsing produces a tagged
//! [`ModelReply`]; on success every field is validated and coerced
//! (numeric clamp to [0, 1], list truncation, enum defaults), and on
//! parse failure the endpoint's fixed fallback literal is substituted
//! so the request still succeeds with a usable payload. Parse failures
//! are logged, never surfaced as request errors.

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use mnema_core::defaults::{
    ANALYSIS_EXCERPT_CHARS, CONFIDENCE_FLOOR, MAX_IMAGE_OBJECTS, MAX_IMAGE_SUGGESTIONS,
    MAX_KEYWORDS, MAX_SUGGESTIONS, MAX_TOPICS, SNIPPET_MAX_CHARS,
};
use mnema_core::{ContentAnalysis, ImageAnalysis, ModelReply, Sentiment, Suggestion, SuggestionType};

use crate::ranking::truncate_chars;

/// Clamp a model-declared score/confidence to [0, 1]. NaN becomes 0.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Extract and parse the first JSON value from raw model text.
///
/// Tolerates markdown code fences and surrounding prose: if the full
/// text is not valid JSON, the first balanced `{...}` or `[...]` block
/// is tried instead.
pub fn parse_reply(raw: &str) -> ModelReply {
    let stripped = strip_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(stripped.trim()) {
        return ModelReply::Parsed(value);
    }

    for open in ['{', '['] {
        if let Some(block) = balanced_block(&stripped, open) {
            if let Ok(value) = serde_json::from_str::<Value>(block) {
                return ModelReply::Parsed(value);
            }
        }
    }

    ModelReply::Unparseable {
        raw: raw.to_string(),
        reason: "no valid JSON value found in model output".to_string(),
    }
}

/// Strip a leading/trailing markdown code fence if present.
fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop an optional language tag on the fence line.
        let rest = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
        return rest.trim_end_matches('`').trim().to_string();
    }
    trimmed.to_string()
}

/// Find the first balanced block opened by `open`, respecting strings.
fn balanced_block(text: &str, open: char) -> Option<&str> {
    let close = match open {
        '{' => '}',
        '[' => ']',
        _ => return None,
    };
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse an embedding vector from a model reply. Returns None (an
/// explicit "no embedding available" state) when the reply is not a
/// bare numeric array.
pub fn parse_embedding(raw: &str) -> Option<Vec<f32>> {
    let reply = parse_reply(raw);
    let value = match reply {
        ModelReply::Parsed(v) => v,
        ModelReply::Unparseable { reason, .. } => {
            warn!(error = %reason, "Embedding reply unparseable; falling back to lexical scoring");
            return None;
        }
    };
    let array = value.as_array()?;
    let floats: Vec<f32> = array
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect();
    if floats.len() == array.len() && !floats.is_empty() {
        Some(floats)
    } else {
        None
    }
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Fixed fallback suggestion list: two generic items with confidences
/// 0.7 and 0.6.
pub fn fallback_suggestions(candidate_id: Uuid) -> Vec<Suggestion> {
    vec![
        Suggestion {
            id: format!("{}-1", candidate_id),
            suggestion_type: SuggestionType::RelatedContent,
            title: "Review related content".to_string(),
            description: "Look for related items in this knowledge base".to_string(),
            confidence: 0.7,
        },
        Suggestion {
            id: format!("{}-2", candidate_id),
            suggestion_type: SuggestionType::Improvement,
            title: "Add more detail".to_string(),
            description: "Expand this content with additional context".to_string(),
            confidence: 0.6,
        },
    ]
}

/// Normalize a suggestion reply. Confidence is clamped, items below
/// the 0.5 floor are dropped, the list is truncated to 5, and unknown
/// types are coerced. Any parse failure yields the fixed fallback, as
/// does a parsed reply whose every item falls below the floor: the
/// endpoint always returns the two generic items rather than an empty
/// list.
pub fn normalize_suggestions(raw: &str, candidate_id: Uuid) -> Vec<Suggestion> {
    let value = match parse_reply(raw) {
        ModelReply::Parsed(v) => v,
        ModelReply::Unparseable { reason, .. } => {
            warn!(
                candidate_id = %candidate_id,
                error = %reason,
                "Suggestion reply unparseable; using fallback"
            );
            return fallback_suggestions(candidate_id);
        }
    };

    let items = match value.get("suggestions").and_then(|s| s.as_array()) {
        Some(items) => items,
        None => {
            warn!(candidate_id = %candidate_id, "Suggestion reply missing 'suggestions' array; using fallback");
            return fallback_suggestions(candidate_id);
        }
    };

    let mut suggestions: Vec<Suggestion> = items
        .iter()
        .filter_map(|item| {
            let title = non_empty_str(item.get("title"))?;
            let confidence = clamp_unit(
                item.get("confidence").and_then(|c| c.as_f64()).unwrap_or(0.0) as f32,
            );
            Some(Suggestion {
                id: String::new(),
                suggestion_type: SuggestionType::coerce(
                    item.get("type").and_then(|t| t.as_str()).unwrap_or(""),
                ),
                title,
                description: item
                    .get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or("")
                    .to_string(),
                confidence,
            })
        })
        .filter(|s| s.confidence >= CONFIDENCE_FLOOR)
        .collect();
    suggestions.truncate(MAX_SUGGESTIONS);

    if suggestions.is_empty() {
        return fallback_suggestions(candidate_id);
    }

    // Deterministic ids: derived from the candidate and position, so
    // identical model output always yields an identical result.
    for (i, s) in suggestions.iter_mut().enumerate() {
        s.id = format!("{}-{}", candidate_id, i + 1);
    }
    suggestions
}

// =============================================================================
// CONTENT ANALYSIS
// =============================================================================

/// Fixed fallback for content analysis: truncated source text as the
/// summary, neutral sentiment, empty lists.
pub fn fallback_content_analysis(source_text: &str) -> ContentAnalysis {
    ContentAnalysis {
        summary: truncate_chars(source_text.trim(), SNIPPET_MAX_CHARS),
        keywords: Vec::new(),
        sentiment: Sentiment::Neutral,
        topics: Vec::new(),
    }
}

/// Normalize a content-analysis reply, coercing sentiment and
/// truncating keyword/topic lists. Parse failure yields the fallback.
pub fn normalize_content_analysis(raw: &str, source_text: &str) -> ContentAnalysis {
    let value = match parse_reply(raw) {
        ModelReply::Parsed(v) => v,
        ModelReply::Unparseable { reason, .. } => {
            warn!(error = %reason, "Analysis reply unparseable; using fallback");
            return fallback_content_analysis(source_text);
        }
    };

    let summary = match non_empty_str(value.get("summary")) {
        Some(s) => s,
        None => {
            warn!("Analysis reply missing 'summary'; using fallback");
            return fallback_content_analysis(source_text);
        }
    };

    ContentAnalysis {
        summary,
        keywords: string_list(value.get("keywords"), MAX_KEYWORDS),
        sentiment: Sentiment::coerce(
            value.get("sentiment").and_then(|s| s.as_str()).unwrap_or(""),
        ),
        topics: string_list(value.get("topics"), MAX_TOPICS),
    }
}

// =============================================================================
// IMAGE ANALYSIS
// =============================================================================

/// Fixed fallback for image analysis. Perception output survives a
/// generative failure: detected text is preserved in the payload.
pub fn fallback_image_analysis(detected_text: &str) -> ImageAnalysis {
    ImageAnalysis {
        description: "Image analysis is unavailable".to_string(),
        objects: Vec::new(),
        text: detected_text.to_string(),
        confidence: 0.5,
        suggestions: Vec::new(),
    }
}

/// Normalize an image-analysis reply: clamp confidence, truncate
/// object/suggestion lists, keep detected text when the model omits
/// its own. Parse failure yields the fallback.
pub fn normalize_image_analysis(raw: &str, detected_text: &str) -> ImageAnalysis {
    let value = match parse_reply(raw) {
        ModelReply::Parsed(v) => v,
        ModelReply::Unparseable { reason, .. } => {
            warn!(error = %reason, "Image analysis reply unparseable; using fallback");
            return fallback_image_analysis(detected_text);
        }
    };

    let description = match non_empty_str(value.get("description")) {
        Some(d) => d,
        None => {
            warn!("Image analysis reply missing 'description'; using fallback");
            return fallback_image_analysis(detected_text);
        }
    };

    let text = value
        .get("text")
        .and_then(|t| t.as_str())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(detected_text)
        .to_string();

    ImageAnalysis {
        description: truncate_chars(&description, ANALYSIS_EXCERPT_CHARS),
        objects: string_list(value.get("objects"), MAX_IMAGE_OBJECTS),
        text,
        confidence: clamp_unit(
            value.get("confidence").and_then(|c| c.as_f64()).unwrap_or(0.5) as f32,
        ),
        suggestions: string_list(value.get("suggestions"), MAX_IMAGE_SUGGESTIONS),
    }
}

// =============================================================================
// FIELD HELPERS
// =============================================================================

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: Option<&Value>, max: usize) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .take(max)
                .collect()
        })
        .unwrap_or_default()
}
