//! Ranking and thresholding of scored candidates.

use tracing::debug;

use mnema_core::defaults::SNIPPET_MAX_CHARS;
use mnema_core::RelevanceResult;

/// Sort results descending by score, drop entries below `threshold`,
/// and truncate to `limit`.
///
/// The sort is stable: ties keep the gatherer's original order, with
/// no score-independent tie-break.
pub fn rank_and_filter(
    mut results: Vec<RelevanceResult>,
    threshold: f32,
    limit: usize,
) -> Vec<RelevanceResult> {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.retain(|r| r.score >= threshold);
    results.truncate(limit);

    debug!(
        threshold = threshold,
        limit = limit,
        result_count = results.len(),
        "Ranked and filtered relevance results"
    );

    results
}

/// First `SNIPPET_MAX_CHARS` characters of `text`, char-boundary safe.
pub fn make_snippet(text: &str) -> String {
    truncate_chars(text, SNIPPET_MAX_CHARS)
}

/// Truncate a string to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn result(score: f32, name: &str) -> RelevanceResult {
        RelevanceResult {
            candidate_id: Uuid::new_v4(),
            display_name: name.to_string(),
            score,
            snippet: String::new(),
        }
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank_and_filter(
            vec![result(0.3, "low"), result(0.9, "high"), result(0.6, "mid")],
            0.0,
            10,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_rank_descending_pairwise_property() {
        let ranked = rank_and_filter(
            vec![
                result(0.1, "a"),
                result(0.8, "b"),
                result(0.5, "c"),
                result(0.8, "d"),
            ],
            0.0,
            10,
        );
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_ties_keep_original_order() {
        let ranked = rank_and_filter(
            vec![
                result(0.5, "first"),
                result(0.5, "second"),
                result(0.5, "third"),
            ],
            0.0,
            10,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_threshold_drops_low_scores() {
        let ranked = rank_and_filter(vec![result(0.9, "keep"), result(0.3, "drop")], 0.7, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].display_name, "keep");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let ranked = rank_and_filter(vec![result(0.7, "exact")], 0.7, 10);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_semantic_vs_vector_thresholds() {
        // Cosine scores 0.9 and 0.3: semantic (0.7) keeps one, vector
        // (0.3) keeps both ordered [0.9, 0.3].
        let input = vec![result(0.9, "a"), result(0.3, "b")];

        let semantic = rank_and_filter(input.clone(), 0.7, 20);
        assert_eq!(semantic.len(), 1);
        assert_eq!(semantic[0].score, 0.9);

        let vector = rank_and_filter(input, 0.3, 20);
        assert_eq!(vector.len(), 2);
        assert_eq!(vector[0].score, 0.9);
        assert_eq!(vector[1].score, 0.3);
    }

    #[test]
    fn test_limit_truncation() {
        let input: Vec<RelevanceResult> = (0..30).map(|i| result(0.9, &format!("r{}", i))).collect();
        let ranked = rank_and_filter(input, 0.0, 20);
        assert_eq!(ranked.len(), 20);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_and_filter(vec![], 0.5, 10).is_empty());
    }

    #[test]
    fn test_make_snippet_truncates_to_200_chars() {
        let long = "x".repeat(500);
        assert_eq!(make_snippet(&long).chars().count(), 200);
    }

    #[test]
    fn test_make_snippet_short_text_unchanged() {
        assert_eq!(make_snippet("short"), "short");
    }

    #[test]
    fn test_truncate_chars_multibyte_safe() {
        let text = "héllo wörld".repeat(40);
        let truncated = truncate_chars(&text, 200);
        assert_eq!(truncated.chars().count(), 200);
        // Must not panic on char boundaries and must stay valid UTF-8.
        assert!(text.starts_with(&truncated));
    }
}
