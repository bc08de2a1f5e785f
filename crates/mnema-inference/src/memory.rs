//! In-memory collaborator implementations.
//!
//! Used for tests and for single-process local deployments where no
//! external metadata or object store is configured. Builders take
//! ownership so fixtures read as one expression.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use mnema_core::{
    CallerIdentity, ContentRecord, Error, IdentityProvider, MetadataStore, ObjectStorage, Result,
    ScopeRecord,
};

/// In-memory [`MetadataStore`].
#[derive(Default)]
pub struct MemoryMetadataStore {
    scopes: RwLock<HashMap<Uuid, ScopeRecord>>,
    content: RwLock<HashMap<Uuid, ContentRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(self, scope: ScopeRecord) -> Self {
        self.scopes
            .write()
            .expect("scope map poisoned")
            .insert(scope.scope_id, scope);
        self
    }

    pub fn with_content(self, record: ContentRecord) -> Self {
        self.content
            .write()
            .expect("content map poisoned")
            .insert(record.id, record);
        self
    }

    pub fn insert_scope(&self, scope: ScopeRecord) {
        self.scopes
            .write()
            .expect("scope map poisoned")
            .insert(scope.scope_id, scope);
    }

    pub fn insert_content(&self, record: ContentRecord) {
        self.content
            .write()
            .expect("content map poisoned")
            .insert(record.id, record);
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get_scope(&self, scope_id: Uuid) -> Result<Option<ScopeRecord>> {
        Ok(self
            .scopes
            .read()
            .expect("scope map poisoned")
            .get(&scope_id)
            .cloned())
    }

    async fn get_content(&self, content_id: Uuid) -> Result<Option<ContentRecord>> {
        Ok(self
            .content
            .read()
            .expect("content map poisoned")
            .get(&content_id)
            .cloned())
    }

    async fn list_scope_content(&self, scope_id: Uuid) -> Result<Vec<ContentRecord>> {
        let map = self.content.read().expect("content map poisoned");
        let mut records: Vec<ContentRecord> = map
            .values()
            .filter(|r| r.scope_id == scope_id)
            .cloned()
            .collect();
        // Recency-descending; id breaks creation-time ties.
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(records)
    }
}

/// In-memory [`ObjectStorage`] keyed by storage key.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, storage_key: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.objects
            .write()
            .expect("object map poisoned")
            .insert(storage_key.into(), bytes);
        self
    }

    pub fn insert_object(&self, storage_key: impl Into<String>, bytes: Vec<u8>) {
        self.objects
            .write()
            .expect("object map poisoned")
            .insert(storage_key.into(), bytes);
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn get_bytes(&self, storage_key: &str) -> Result<Vec<u8>> {
        self.objects
            .read()
            .expect("object map poisoned")
            .get(storage_key)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("No object stored at {}", storage_key)))
    }
}

/// Identity provider that accepts exactly one bearer token and maps it
/// to a fixed caller. Suited to single-user local deployments.
pub struct StaticTokenIdentity {
    token: String,
    caller_id: Uuid,
}

impl StaticTokenIdentity {
    pub fn new(token: impl Into<String>, caller_id: Uuid) -> Self {
        Self {
            token: token.into(),
            caller_id,
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentity {
    async fn verify(&self, token: &str) -> Result<CallerIdentity> {
        if token == self.token {
            Ok(CallerIdentity {
                caller_id: self.caller_id,
            })
        } else {
            Err(Error::Unauthorized("Invalid bearer token".to_string()))
        }
    }
}
