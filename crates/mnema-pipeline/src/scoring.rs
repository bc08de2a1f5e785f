//! Relevance scoring: vector cosine similarity with a lexical overlap
//! fallback.
//!
//! Both algorithms yield values in [0, 1] by construction. Downstream
//! normalization still clamps, but nothing here should ever escape the
//! unit interval.

use mnema_core::ContentCandidate;

/// Cosine similarity between two vectors, clamped to [0, 1].
///
/// Returns 0.0 when the dimensions mismatch or either norm is zero.
pub fn cosine_similarity(q: &[f32], v: &[f32]) -> f32 {
    if q.len() != v.len() || q.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_q = 0.0f32;
    let mut norm_v = 0.0f32;
    for (a, b) in q.iter().zip(v.iter()) {
        dot += a * b;
        norm_q += a * a;
        norm_v += b * b;
    }

    if norm_q == 0.0 || norm_v == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_q.sqrt() * norm_v.sqrt());
    score.clamp(0.0, 1.0)
}

/// Fraction of query tokens literally present in the candidate text.
///
/// Tokens are lowercase whitespace splits. An empty query scores 0.0.
pub fn lexical_overlap(query: &str, text: &str) -> f32 {
    let query_tokens: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();
    if query_tokens.is_empty() {
        return 0.0;
    }

    let candidate_tokens: std::collections::HashSet<String> = text
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    let matched = query_tokens
        .iter()
        .filter(|t| candidate_tokens.contains(*t))
        .count();

    matched as f32 / query_tokens.len() as f32
}

/// Score one candidate against a query.
///
/// Uses cosine similarity when both a query vector and a stored
/// candidate embedding exist; falls back to lexical overlap otherwise.
pub fn score_candidate(
    query_text: &str,
    query_vec: Option<&[f32]>,
    candidate: &ContentCandidate,
) -> f32 {
    match (query_vec, candidate.embedding.as_deref()) {
        (Some(q), Some(v)) => cosine_similarity(q, v),
        _ => lexical_overlap(query_text, candidate.text().unwrap_or("")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::{CandidateBody, MimeCategory};
    use uuid::Uuid;

    fn text_candidate(text: &str, embedding: Option<Vec<f32>>) -> ContentCandidate {
        ContentCandidate {
            id: Uuid::new_v4(),
            scope_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            display_name: "doc".to_string(),
            mime_category: MimeCategory::Document,
            body: CandidateBody::Text(text.to_string()),
            embedding,
        }
    }

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.5, 0.3, 0.8];
        let score = cosine_similarity(&v, &v);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_cosine_opposite_vectors_clamped_to_zero() {
        // Raw cosine is -1; the score space is [0, 1].
        let score = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let score = cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let score = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_cosine_empty_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_bounds_randomized() {
        // Deterministic pseudo-random walk over many vector pairs.
        let mut seed = 0x2545F4914F6CDD1Du64;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed as f32 / u64::MAX as f32) * 2.0 - 1.0
        };
        for _ in 0..100 {
            let q: Vec<f32> = (0..16).map(|_| next()).collect();
            let v: Vec<f32> = (0..16).map(|_| next()).collect();
            let score = cosine_similarity(&q, &v);
            assert!((0.0..=1.0).contains(&score), "score {} out of bounds", score);
        }
    }

    #[test]
    fn test_lexical_overlap_full_match() {
        let score = lexical_overlap("hello world", "world says hello to you");
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lexical_overlap_partial_match() {
        let score = lexical_overlap("rust async tokio", "rust is great");
        assert!((score - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_lexical_overlap_case_insensitive() {
        let score = lexical_overlap("Rust TOKIO", "rust tokio runtime");
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lexical_overlap_no_match() {
        assert_eq!(lexical_overlap("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn test_lexical_overlap_empty_query() {
        assert_eq!(lexical_overlap("", "some text"), 0.0);
        assert_eq!(lexical_overlap("   ", "some text"), 0.0);
    }

    #[test]
    fn test_lexical_overlap_empty_text() {
        assert_eq!(lexical_overlap("query words", ""), 0.0);
    }

    #[test]
    fn test_lexical_overlap_repeated_query_tokens() {
        // Each occurrence of a query token counts toward the ratio.
        let score = lexical_overlap("go go stop", "go fast");
        assert!((score - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_candidate_prefers_vectors_when_both_exist() {
        let candidate = text_candidate("irrelevant text", Some(vec![1.0, 0.0]));
        let score = score_candidate("irrelevant text", Some(&[1.0, 0.0]), &candidate);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_candidate_lexical_fallback_without_embedding() {
        let candidate = text_candidate("rust is great", None);
        let score = score_candidate("rust", Some(&[1.0, 0.0]), &candidate);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_candidate_lexical_fallback_without_query_vector() {
        let candidate = text_candidate("rust is great", Some(vec![1.0, 0.0]));
        let score = score_candidate("rust", None, &candidate);
        assert!((score - 1.0).abs() < 1e-6);
    }
}
