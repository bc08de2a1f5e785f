//! Prompt synthesis: per-endpoint templates with mandatory excerpt
//! truncation and explicit output-schema instructions.
//!
//! The synthesizer never sends raw unbounded content. Every excerpt is
//! truncated to the template's character ceiling before assembly.

use mnema_core::defaults::{
    ANALYSIS_EXCERPT_CHARS, QUERY_SOURCE_EXCERPT_CHARS, SCORING_EXCERPT_CHARS,
};
use mnema_core::ModelPrompt;

use crate::ranking::truncate_chars;

/// A parameterized prompt template: role framing, behavioral guidance,
/// required output shape, and the excerpt ceiling enforced at build
/// time.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub role: &'static str,
    pub guidance: &'static str,
    pub output_schema: String,
    pub excerpt_ceiling: usize,
}

impl PromptTemplate {
    /// Build an immutable [`ModelPrompt`], truncating every excerpt to
    /// this template's ceiling first.
    pub fn build(&self, excerpts: &[&str]) -> ModelPrompt {
        ModelPrompt {
            instruction: format!("{}\n{}", self.role, self.guidance),
            excerpts: excerpts
                .iter()
                .map(|e| truncate_chars(e, self.excerpt_ceiling))
                .collect(),
            output_schema: self.output_schema.clone(),
        }
    }

    /// Query answering over ranked source excerpts.
    pub fn query_answer() -> Self {
        Self {
            role: "You are a knowledgeable assistant answering a question using only the \
                   provided knowledge base content.",
            guidance: "Answer the question below using the content excerpts. If the content \
                       does not cover the question, say so plainly. Do not invent sources.",
            output_schema: "Respond with a concise plain-text answer.".to_string(),
            excerpt_ceiling: QUERY_SOURCE_EXCERPT_CHARS,
        }
    }

    /// Query embedding for vector search. The reply must be a bare
    /// JSON array of numbers; anything else is treated as "no
    /// embedding available" and scoring falls back to lexical overlap.
    pub fn query_embedding(dimension: usize) -> Self {
        Self {
            role: "You are an embedding service.",
            guidance: "Produce a semantic embedding for the text below.",
            output_schema: if dimension == 0 {
                "Respond with only a JSON array of numbers, e.g. [0.12, -0.43, 0.88]. No prose."
                    .to_string()
            } else {
                format!(
                    "Respond with only a JSON array of exactly {} numbers, \
                     e.g. [0.12, -0.43, 0.88]. No prose.",
                    dimension
                )
            },
            excerpt_ceiling: SCORING_EXCERPT_CHARS,
        }
    }

    /// Suggestion generation for one content item.
    pub fn suggestions() -> Self {
        Self {
            role: "You are a knowledge management assistant reviewing one item from a \
                   personal knowledge base.",
            guidance: "Suggest up to 5 follow-ups for this content. Be strict: only include \
                       suggestions with confidence of at least 0.5.",
            output_schema: r#"Respond with only JSON in this exact shape:
{"suggestions": [{"type": "related_content|improvement|action_item", "title": "...", "description": "...", "confidence": 0.0}]}
Confidence must be between 0.0 and 1.0."#
                .to_string(),
            excerpt_ceiling: ANALYSIS_EXCERPT_CHARS,
        }
    }

    /// Content analysis (summary, keywords, sentiment, topics).
    pub fn content_analysis() -> Self {
        Self {
            role: "You are a content analyst summarizing one item from a personal \
                   knowledge base.",
            guidance: "Analyze the content below. Keep the summary under three sentences, \
                       at most 5 keywords and at most 3 topics.",
            output_schema: r#"Respond with only JSON in this exact shape:
{"summary": "...", "keywords": ["..."], "sentiment": "positive|negative|neutral", "topics": ["..."]}"#
                .to_string(),
            excerpt_ceiling: ANALYSIS_EXCERPT_CHARS,
        }
    }

    /// Image analysis over joined perception output.
    pub fn image_analysis() -> Self {
        Self {
            role: "You are an image analyst. You receive machine perception output \
                   (detected labels and detected text) for one image.",
            guidance: "Describe the image, list the notable objects, and suggest up to 3 \
                       follow-up actions. Confidence must reflect the perception evidence.",
            output_schema: r#"Respond with only JSON in this exact shape:
{"description": "...", "objects": ["..."], "text": "...", "confidence": 0.0, "suggestions": ["..."]}
Confidence must be between 0.0 and 1.0."#
                .to_string(),
            excerpt_ceiling: ANALYSIS_EXCERPT_CHARS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_truncates_excerpts_to_ceiling() {
        let template = PromptTemplate::query_embedding(0);
        let long = "a".repeat(5000);
        let prompt = template.build(&[&long]);
        assert_eq!(prompt.excerpts[0].chars().count(), SCORING_EXCERPT_CHARS);
    }

    #[test]
    fn test_build_keeps_short_excerpts() {
        let template = PromptTemplate::content_analysis();
        let prompt = template.build(&["short text"]);
        assert_eq!(prompt.excerpts, vec!["short text".to_string()]);
    }

    #[test]
    fn test_analysis_ceiling_larger_than_scoring_ceiling() {
        assert!(
            PromptTemplate::content_analysis().excerpt_ceiling
                > PromptTemplate::query_embedding(0).excerpt_ceiling
        );
    }

    #[test]
    fn test_suggestions_schema_names_required_fields() {
        let prompt = PromptTemplate::suggestions().build(&["content"]);
        let rendered = prompt.render();
        for field in ["suggestions", "type", "title", "description", "confidence"] {
            assert!(rendered.contains(field), "schema missing field {}", field);
        }
        assert!(rendered.contains("related_content|improvement|action_item"));
    }

    #[test]
    fn test_content_analysis_schema_names_enum_values() {
        let rendered = PromptTemplate::content_analysis().build(&["x"]).render();
        assert!(rendered.contains("positive|negative|neutral"));
    }

    #[test]
    fn test_query_embedding_schema_mentions_dimension() {
        let rendered = PromptTemplate::query_embedding(384).build(&["q"]).render();
        assert!(rendered.contains("exactly 384 numbers"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = PromptTemplate::image_analysis().build(&["one", "two"]);
        let b = PromptTemplate::image_analysis().build(&["one", "two"]);
        assert_eq!(a, b);
        assert_eq!(a.render(), b.render());
    }
}
