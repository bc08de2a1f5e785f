//! Content analysis for one text item.

use tracing::warn;
use uuid::Uuid;

use mnema_core::{ContentAnalysis, Error, Result};

use crate::gather::gather_single;
use crate::guard::ensure_content_access;
use crate::normalize::{fallback_content_analysis, normalize_content_analysis};
use crate::prompt::PromptTemplate;
use crate::Collaborators;

/// Analyze one text content item (summary, keywords, sentiment,
/// topics).
///
/// Image and audio items have their own endpoints; requesting text
/// analysis for them is a validation error. A generation failure or
/// unparseable reply degrades to the deterministic fallback.
pub async fn run_content_analysis(
    collab: &Collaborators,
    caller_id: Uuid,
    scope_id: Uuid,
    content_id: Uuid,
) -> Result<ContentAnalysis> {
    let record =
        ensure_content_access(collab.metadata.as_ref(), caller_id, scope_id, content_id).await?;
    let candidate = gather_single(collab.storage.as_ref(), &record).await?;

    let text = candidate.text().ok_or_else(|| {
        Error::Validation("Content analysis requires a text item".to_string())
    })?;

    let prompt = PromptTemplate::content_analysis().build(&[text]);

    match collab.generation.generate(&prompt.render()).await {
        Ok(raw) => Ok(normalize_content_analysis(&raw, text)),
        Err(e) => {
            warn!(
                candidate_id = %content_id,
                error = %e,
                "Content analysis generation failed; using fallback"
            );
            Ok(fallback_content_analysis(text))
        }
    }
}
