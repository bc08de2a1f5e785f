//! Candidate gathering: loading metadata plus raw bytes/text for one
//! item or a whole scope.
//!
//! Scope-wide gathering fans out the per-item byte fetches and keeps
//! each result as an explicit `Result`, so a single slow or failing
//! fetch never aborts the request. Failures are logged and the item is
//! dropped.

use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use mnema_core::{
    CandidateBody, ContentCandidate, ContentRecord, MimeCategory, ObjectStorage, Result,
};

/// Why one candidate's body fetch failed. Carried per-item so tests
/// can assert on the failure arena instead of a swallowed exception.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub content_id: Uuid,
    pub message: String,
}

/// Fetch the body for a single content record.
pub async fn gather_single(
    storage: &dyn ObjectStorage,
    record: &ContentRecord,
) -> Result<ContentCandidate> {
    let bytes = storage.get_bytes(&record.storage_key).await?;
    Ok(candidate_from_bytes(record, bytes))
}

/// Gather all candidates in a scope with per-item failure isolation.
///
/// Returns one `Result` per record, in the metadata query's order.
pub async fn gather_scope_results(
    storage: &dyn ObjectStorage,
    records: &[ContentRecord],
) -> Vec<std::result::Result<ContentCandidate, FetchFailure>> {
    let fetches = records.iter().map(|record| async move {
        match storage.get_bytes(&record.storage_key).await {
            Ok(bytes) => Ok(candidate_from_bytes(record, bytes)),
            Err(e) => Err(FetchFailure {
                content_id: record.id,
                message: e.to_string(),
            }),
        }
    });
    join_all(fetches).await
}

/// Gather all scoreable candidates in a scope.
///
/// Fetch failures are logged and dropped; candidates with
/// empty/whitespace-only text are excluded before scoring. Ordering is
/// the metadata query's insertion order.
pub async fn gather_scope(
    storage: &dyn ObjectStorage,
    records: &[ContentRecord],
) -> Vec<ContentCandidate> {
    let total = records.len();
    let candidates: Vec<ContentCandidate> = gather_scope_results(storage, records)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(candidate) => Some(candidate),
            Err(failure) => {
                warn!(
                    candidate_id = %failure.content_id,
                    error = %failure.message,
                    "Dropping candidate after failed body fetch"
                );
                None
            }
        })
        .filter(|c| match c.text() {
            Some(text) => !text.trim().is_empty(),
            None => true,
        })
        .collect();

    debug!(
        candidate_count = total,
        result_count = candidates.len(),
        "Gathered scope candidates"
    );

    candidates
}

fn candidate_from_bytes(record: &ContentRecord, bytes: Vec<u8>) -> ContentCandidate {
    let body = match record.mime_category {
        MimeCategory::Image | MimeCategory::Audio => CandidateBody::Bytes(bytes),
        MimeCategory::Document | MimeCategory::Other => {
            CandidateBody::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    };
    ContentCandidate {
        id: record.id,
        scope_id: record.scope_id,
        owner_id: record.owner_id,
        display_name: record.display_name.clone(),
        mime_category: record.mime_category,
        body,
        embedding: record.embedding.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_inference::memory::MemoryObjectStorage;

    fn record(name: &str, key: &str, category: MimeCategory) -> ContentRecord {
        ContentRecord {
            id: Uuid::new_v4(),
            scope_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            display_name: name.to_string(),
            mime_category: category,
            storage_key: key.to_string(),
            embedding: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_gather_single_document_decodes_text() {
        let storage = MemoryObjectStorage::new().with_object("k1", b"hello world".to_vec());
        let rec = record("doc.md", "k1", MimeCategory::Document);

        let candidate = gather_single(&storage, &rec).await.unwrap();
        assert_eq!(candidate.text(), Some("hello world"));
    }

    #[tokio::test]
    async fn test_gather_single_image_keeps_bytes() {
        let storage = MemoryObjectStorage::new().with_object("k1", vec![0xFF, 0xD8, 0xFF]);
        let rec = record("pic.jpg", "k1", MimeCategory::Image);

        let candidate = gather_single(&storage, &rec).await.unwrap();
        assert!(candidate.text().is_none());
        assert_eq!(candidate.bytes().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_gather_single_missing_object_errors() {
        let storage = MemoryObjectStorage::new();
        let rec = record("doc.md", "missing", MimeCategory::Document);
        assert!(gather_single(&storage, &rec).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_fetch_drops_only_that_candidate() {
        // Three records, middle one has no stored object.
        let storage = MemoryObjectStorage::new()
            .with_object("a", b"alpha text".to_vec())
            .with_object("c", b"gamma text".to_vec());
        let records = vec![
            record("a.md", "a", MimeCategory::Document),
            record("b.md", "b", MimeCategory::Document),
            record("c.md", "c", MimeCategory::Document),
        ];

        let candidates = gather_scope(&storage, &records).await;
        let names: Vec<&str> = candidates.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "c.md"]);
    }

    #[tokio::test]
    async fn test_per_item_results_preserve_order_and_failures() {
        let storage = MemoryObjectStorage::new().with_object("a", b"alpha".to_vec());
        let records = vec![
            record("a.md", "a", MimeCategory::Document),
            record("b.md", "b", MimeCategory::Document),
        ];

        let results = gather_scope_results(&storage, &records).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let failure = results[1].as_ref().unwrap_err();
        assert_eq!(failure.content_id, records[1].id);
        assert!(!failure.message.is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_only_text_excluded() {
        let storage = MemoryObjectStorage::new()
            .with_object("a", b"  \n\t ".to_vec())
            .with_object("b", b"real content".to_vec());
        let records = vec![
            record("blank.md", "a", MimeCategory::Document),
            record("real.md", "b", MimeCategory::Document),
        ];

        let candidates = gather_scope(&storage, &records).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].display_name, "real.md");
    }

    #[tokio::test]
    async fn test_binary_candidates_not_excluded_by_text_filter() {
        let storage = MemoryObjectStorage::new().with_object("img", vec![0x00, 0x01]);
        let records = vec![record("pic.png", "img", MimeCategory::Image)];

        let candidates = gather_scope(&storage, &records).await;
        assert_eq!(candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_scope_yields_no_candidates() {
        let storage = MemoryObjectStorage::new();
        let candidates = gather_scope(&storage, &[]).await;
        assert!(candidates.is_empty());
    }
}
