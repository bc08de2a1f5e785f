//! Semantic and vector search over a scope.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use mnema_core::defaults::{
    MAX_SEARCH_RESULTS, SEMANTIC_SEARCH_THRESHOLD, VECTOR_SEARCH_THRESHOLD,
};
use mnema_core::{ContentCandidate, RelevanceResult, Result};

use crate::gather::gather_scope;
use crate::guard::ensure_scope_access;
use crate::normalize::parse_embedding;
use crate::prompt::PromptTemplate;
use crate::ranking::{make_snippet, rank_and_filter};
use crate::scoring::score_candidate;
use crate::Collaborators;

/// One vector-search hit. The embedding is the candidate's stored
/// vector when one exists; candidates without an embedding carry none
/// (explicit "no embedding available" state).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VectorSearchHit {
    pub candidate_id: Uuid,
    pub display_name: String,
    pub score: f32,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

fn effective_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(MAX_SEARCH_RESULTS).min(MAX_SEARCH_RESULTS)
}

/// Relevance search over a scope, threshold 0.7.
///
/// Candidates with stored embeddings are scored by cosine similarity
/// against the query vector; candidates without one (or the whole
/// scope, when no query vector can be obtained) fall back to lexical
/// overlap.
pub async fn run_semantic_search(
    collab: &Collaborators,
    caller_id: Uuid,
    scope_id: Uuid,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<RelevanceResult>> {
    ensure_scope_access(collab.metadata.as_ref(), caller_id, scope_id).await?;

    let records = collab.metadata.list_scope_content(scope_id).await?;
    let candidates = gather_scope(collab.storage.as_ref(), &records).await;

    let query_vec = request_query_embedding(collab, query, &candidates).await;

    let scored = candidates
        .iter()
        .map(|c| relevance(c, score_candidate(query, query_vec.as_deref(), c)))
        .collect();

    Ok(rank_and_filter(
        scored,
        SEMANTIC_SEARCH_THRESHOLD,
        effective_limit(limit),
    ))
}

/// Vector similarity search over a scope, threshold 0.3.
///
/// The query vector is requested from the generative backend; when the
/// reply does not parse as a numeric array of the stored dimension,
/// scoring falls back to lexical overlap for every candidate rather
/// than fabricating a pseudo-vector.
pub async fn run_vector_search(
    collab: &Collaborators,
    caller_id: Uuid,
    scope_id: Uuid,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<VectorSearchHit>> {
    ensure_scope_access(collab.metadata.as_ref(), caller_id, scope_id).await?;

    let records = collab.metadata.list_scope_content(scope_id).await?;
    let candidates = gather_scope(collab.storage.as_ref(), &records).await;

    let query_vec = request_query_embedding(collab, query, &candidates).await;

    let scored: Vec<RelevanceResult> = candidates
        .iter()
        .map(|c| relevance(c, score_candidate(query, query_vec.as_deref(), c)))
        .collect();
    let ranked = rank_and_filter(scored, VECTOR_SEARCH_THRESHOLD, effective_limit(limit));

    Ok(ranked
        .into_iter()
        .map(|r| {
            let embedding = candidates
                .iter()
                .find(|c| c.id == r.candidate_id)
                .and_then(|c| c.embedding.clone());
            VectorSearchHit {
                candidate_id: r.candidate_id,
                display_name: r.display_name,
                score: r.score,
                snippet: r.snippet,
                embedding,
            }
        })
        .collect())
}

/// Ask the generative backend for a query embedding matching the
/// dimension of the scope's stored vectors. None when no candidate
/// carries an embedding, when generation fails, or when the reply does
/// not parse as a vector of the right dimension.
async fn request_query_embedding(
    collab: &Collaborators,
    query: &str,
    candidates: &[ContentCandidate],
) -> Option<Vec<f32>> {
    let dimension = candidates
        .iter()
        .find_map(|c| c.embedding.as_ref().map(|e| e.len()))?;

    let prompt = PromptTemplate::query_embedding(dimension).build(&[query]);
    let raw = match collab.generation.generate(&prompt.render()).await {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "Query embedding generation failed; using lexical fallback");
            return None;
        }
    };

    parse_embedding(&raw).filter(|v| v.len() == dimension)
}

fn relevance(candidate: &ContentCandidate, score: f32) -> RelevanceResult {
    RelevanceResult {
        candidate_id: candidate.id,
        display_name: candidate.display_name.clone(),
        score,
        snippet: make_snippet(candidate.text().unwrap_or("")),
    }
}
