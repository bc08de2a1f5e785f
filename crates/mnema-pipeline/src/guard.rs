//! Access guard: ownership checks that gate every pipeline run.
//!
//! No candidate may be scored, no bytes fetched, and no model invoked
//! before the caller's ownership of the target scope or item is
//! confirmed against the metadata store.

use uuid::Uuid;

use mnema_core::{ContentRecord, Error, MetadataStore, Result, ScopeHandle, ScopeRecord};

/// Confirm the caller owns `scope_id`.
///
/// Absent scope → `NotFound`; owner mismatch → `Forbidden`.
pub async fn ensure_scope_access(
    metadata: &dyn MetadataStore,
    caller_id: Uuid,
    scope_id: Uuid,
) -> Result<ScopeRecord> {
    let scope = metadata
        .get_scope(scope_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Knowledge base {} not found", scope_id)))?;

    let claimed = ScopeHandle {
        owner_id: caller_id,
        scope_id,
    };
    if scope.handle() != claimed {
        return Err(Error::Forbidden(
            "You do not have access to this knowledge base".to_string(),
        ));
    }

    Ok(scope)
}

/// Confirm the caller owns `content_id` within `scope_id`.
///
/// A record whose `scope_id` does not match the requested scope is
/// treated as absent rather than leaking its existence.
pub async fn ensure_content_access(
    metadata: &dyn MetadataStore,
    caller_id: Uuid,
    scope_id: Uuid,
    content_id: Uuid,
) -> Result<ContentRecord> {
    ensure_scope_access(metadata, caller_id, scope_id).await?;

    let record = metadata
        .get_content(content_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Content item {} not found", content_id)))?;

    if record.scope_id != scope_id {
        return Err(Error::NotFound(format!(
            "Content item {} not found",
            content_id
        )));
    }

    if record.owner_id != caller_id {
        return Err(Error::Forbidden(
            "You do not have access to this content item".to_string(),
        ));
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::MimeCategory;
    use mnema_inference::memory::MemoryMetadataStore;

    fn scope(owner_id: Uuid) -> ScopeRecord {
        ScopeRecord {
            scope_id: Uuid::new_v4(),
            owner_id,
            name: "kb".to_string(),
        }
    }

    fn content(scope_id: Uuid, owner_id: Uuid) -> ContentRecord {
        ContentRecord {
            id: Uuid::new_v4(),
            scope_id,
            owner_id,
            display_name: "doc.md".to_string(),
            mime_category: MimeCategory::Document,
            storage_key: "doc-key".to_string(),
            embedding: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_scope_access_granted_for_owner() {
        let owner = Uuid::new_v4();
        let s = scope(owner);
        let store = MemoryMetadataStore::new().with_scope(s.clone());

        let got = ensure_scope_access(&store, owner, s.scope_id).await.unwrap();
        assert_eq!(got.scope_id, s.scope_id);
    }

    #[tokio::test]
    async fn test_scope_access_forbidden_for_other_caller() {
        let s = scope(Uuid::new_v4());
        let store = MemoryMetadataStore::new().with_scope(s.clone());

        let err = ensure_scope_access(&store, Uuid::new_v4(), s.scope_id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_scope_access_not_found() {
        let store = MemoryMetadataStore::new();
        let err = ensure_scope_access(&store, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_content_access_granted_for_owner() {
        let owner = Uuid::new_v4();
        let s = scope(owner);
        let c = content(s.scope_id, owner);
        let store = MemoryMetadataStore::new()
            .with_scope(s.clone())
            .with_content(c.clone());

        let got = ensure_content_access(&store, owner, s.scope_id, c.id)
            .await
            .unwrap();
        assert_eq!(got.id, c.id);
    }

    #[tokio::test]
    async fn test_content_in_wrong_scope_is_not_found() {
        let owner = Uuid::new_v4();
        let s = scope(owner);
        let other_scope = scope(owner);
        let c = content(other_scope.scope_id, owner);
        let store = MemoryMetadataStore::new()
            .with_scope(s.clone())
            .with_scope(other_scope)
            .with_content(c.clone());

        let err = ensure_content_access(&store, owner, s.scope_id, c.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_content_access_missing_item() {
        let owner = Uuid::new_v4();
        let s = scope(owner);
        let store = MemoryMetadataStore::new().with_scope(s.clone());

        let err = ensure_content_access(&store, owner, s.scope_id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
