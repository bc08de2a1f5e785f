//! Direct query answering over a scope.

use tracing::{debug, warn};
use uuid::Uuid;

use mnema_core::defaults::MAX_QUERY_SOURCES;
use mnema_core::{QueryAnswer, RelevanceResult, Result};

use crate::gather::gather_scope;
use crate::guard::ensure_scope_access;
use crate::prompt::PromptTemplate;
use crate::ranking::{make_snippet, rank_and_filter};
use crate::scoring::lexical_overlap;
use crate::Collaborators;

/// Answer a question using the caller's scope content.
///
/// Gathers all candidates, ranks them by lexical overlap with the
/// question, embeds the top sources' excerpts into a prompt, and
/// returns the generated answer with at most 5 source names. An empty
/// scope short-circuits to a fixed answer with no model call.
pub async fn run_query(
    collab: &Collaborators,
    caller_id: Uuid,
    scope_id: Uuid,
    query: &str,
) -> Result<QueryAnswer> {
    ensure_scope_access(collab.metadata.as_ref(), caller_id, scope_id).await?;

    let records = collab.metadata.list_scope_content(scope_id).await?;
    let candidates = gather_scope(collab.storage.as_ref(), &records).await;

    if candidates.is_empty() {
        debug!(scope_id = %scope_id, "Query against empty scope; skipping model call");
        return Ok(QueryAnswer {
            response: "This knowledge base has no content yet.".to_string(),
            sources: Vec::new(),
        });
    }

    let scored: Vec<RelevanceResult> = candidates
        .iter()
        .map(|c| RelevanceResult {
            candidate_id: c.id,
            display_name: c.display_name.clone(),
            score: lexical_overlap(query, c.text().unwrap_or("")),
            snippet: make_snippet(c.text().unwrap_or("")),
        })
        .collect();

    // Only candidates with some overlap qualify as sources.
    let ranked = rank_and_filter(scored, f32::EPSILON, MAX_QUERY_SOURCES);

    let texts: Vec<&str> = ranked
        .iter()
        .filter_map(|r| {
            candidates
                .iter()
                .find(|c| c.id == r.candidate_id)
                .and_then(|c| c.text())
        })
        .collect();

    let prompt = PromptTemplate::query_answer().build(&texts);
    let prompt_text = format!("{}\n\nQuestion: {}", prompt.render(), query);

    let answer = collab.generation.generate(&prompt_text).await.map_err(|e| {
        warn!(scope_id = %scope_id, error = %e, "Query generation failed");
        e
    })?;

    Ok(QueryAnswer {
        response: answer.trim().to_string(),
        sources: ranked.into_iter().map(|r| r.display_name).collect(),
    })
}
