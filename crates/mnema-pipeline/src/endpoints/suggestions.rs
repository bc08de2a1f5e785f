//! Suggestion generation for one content item.

use tracing::warn;
use uuid::Uuid;

use mnema_core::{Result, Suggestion};

use crate::gather::gather_single;
use crate::guard::ensure_content_access;
use crate::normalize::{fallback_suggestions, normalize_suggestions};
use crate::prompt::PromptTemplate;
use crate::Collaborators;

/// Generate up to 5 suggestions for a content item.
///
/// A generation failure or unparseable reply degrades to the fixed
/// two-item fallback list; the request still succeeds.
pub async fn run_suggestions(
    collab: &Collaborators,
    caller_id: Uuid,
    scope_id: Uuid,
    content_id: Uuid,
) -> Result<Vec<Suggestion>> {
    let record =
        ensure_content_access(collab.metadata.as_ref(), caller_id, scope_id, content_id).await?;
    let candidate = gather_single(collab.storage.as_ref(), &record).await?;

    // Media items carry no text; the display name still gives the
    // model something to suggest against.
    let excerpt = candidate.text().unwrap_or(&candidate.display_name);
    let prompt = PromptTemplate::suggestions().build(&[excerpt]);

    match collab.generation.generate(&prompt.render()).await {
        Ok(raw) => Ok(normalize_suggestions(&raw, content_id)),
        Err(e) => {
            warn!(
                candidate_id = %content_id,
                error = %e,
                "Suggestion generation failed; using fallback"
            );
            Ok(fallback_suggestions(content_id))
        }
    }
}
