//! In-memory document store.
//!
//! Reference implementation of the document-store collaborator contract:
//! snapshot reads, patch mutations, and replication suspension with a single
//! consolidated outward write per flush. Used by the CLI demo; replication
//! here is bookkeeping (counters a real store would turn into sync traffic).

use async_trait::async_trait;
use easel_application::ports::document_store::{DocumentStorePort, StoreError};
use easel_domain::{CanvasObject, CanvasSize, DocumentSnapshot, ObjectPatch};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

struct DocumentState {
    size: CanvasSize,
    objects: Vec<CanvasObject>,
    selected_ids: Vec<String>,
    replication_suspended: bool,
    pending_writes: u64,
    replicated_writes: u64,
}

/// Thread-safe in-memory document store.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, DocumentState>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty document (replacing any existing one with the id).
    pub async fn create_document(&self, document_id: &str, size: CanvasSize) {
        self.documents.write().await.insert(
            document_id.to_string(),
            DocumentState {
                size,
                objects: Vec::new(),
                selected_ids: Vec::new(),
                replication_suspended: false,
                pending_writes: 0,
                replicated_writes: 0,
            },
        );
    }

    /// Seed a document with objects (test and demo setup).
    pub async fn seed_document(
        &self,
        document_id: &str,
        size: CanvasSize,
        objects: Vec<CanvasObject>,
    ) {
        self.create_document(document_id, size).await;
        if let Some(doc) = self.documents.write().await.get_mut(document_id) {
            doc.objects = objects;
        }
    }

    /// Set the current selection.
    pub async fn set_selection(
        &self,
        document_id: &str,
        selected_ids: Vec<String>,
    ) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let doc = documents
            .get_mut(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        doc.selected_ids = selected_ids;
        Ok(())
    }

    /// Outward writes seen by collaborators (consolidated flushes included).
    pub async fn replicated_writes(&self, document_id: &str) -> u64 {
        self.documents
            .read()
            .await
            .get(document_id)
            .map(|d| d.replicated_writes)
            .unwrap_or(0)
    }

    fn record_write(doc: &mut DocumentState) {
        if doc.replication_suspended {
            doc.pending_writes += 1;
        } else {
            doc.replicated_writes += 1;
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStorePort for InMemoryDocumentStore {
    async fn read_snapshot(&self, document_id: &str) -> Result<DocumentSnapshot, StoreError> {
        let documents = self.documents.read().await;
        let doc = documents
            .get(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        Ok(DocumentSnapshot {
            document_id: document_id.to_string(),
            size: doc.size,
            objects: doc.objects.clone(),
            selected_ids: doc.selected_ids.clone(),
        })
    }

    async fn live_object_ids(&self, document_id: &str) -> Result<HashSet<String>, StoreError> {
        let documents = self.documents.read().await;
        let doc = documents
            .get(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        Ok(doc.objects.iter().map(|o| o.id.clone()).collect())
    }

    async fn create_object(
        &self,
        document_id: &str,
        object: CanvasObject,
    ) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let doc = documents
            .get_mut(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        debug!(document_id, object_id = %object.id, "Object created");
        doc.objects.push(object);
        Self::record_write(doc);
        Ok(())
    }

    async fn apply_mutation(
        &self,
        document_id: &str,
        object_id: &str,
        patch: ObjectPatch,
    ) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let doc = documents
            .get_mut(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        let object = doc
            .objects
            .iter_mut()
            .find(|o| o.id == object_id)
            .ok_or_else(|| StoreError::ObjectNotFound {
                document_id: document_id.to_string(),
                object_id: object_id.to_string(),
            })?;
        patch.apply_to(object);
        Self::record_write(doc);
        Ok(())
    }

    async fn delete_object(&self, document_id: &str, object_id: &str) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let doc = documents
            .get_mut(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        let before = doc.objects.len();
        doc.objects.retain(|o| o.id != object_id);
        if doc.objects.len() == before {
            return Err(StoreError::ObjectNotFound {
                document_id: document_id.to_string(),
                object_id: object_id.to_string(),
            });
        }
        // Deleted objects leave the selection too
        doc.selected_ids.retain(|id| id != object_id);
        Self::record_write(doc);
        Ok(())
    }

    async fn suspend_replication(&self, document_id: &str) {
        if let Some(doc) = self.documents.write().await.get_mut(document_id) {
            doc.replication_suspended = true;
        }
    }

    async fn flush_replication(&self, document_id: &str) {
        if let Some(doc) = self.documents.write().await.get_mut(document_id) {
            doc.replication_suspended = false;
            if doc.pending_writes > 0 {
                debug!(
                    document_id,
                    consolidated = doc.pending_writes,
                    "Replication flushed"
                );
                doc.pending_writes = 0;
                doc.replicated_writes += 1;
            }
        }
    }
}
