//! Shared test doubles for the application test modules.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use easel_domain::{CanvasObject, CanvasSize, DocumentSnapshot};

use crate::ports::document_store::{DocumentStorePort, StoreError};

struct DocState {
    size: CanvasSize,
    objects: Vec<CanvasObject>,
    selected: Vec<String>,
    suspended: bool,
    pending_writes: u64,
    replicated_writes: u64,
    suspend_count: u64,
    flush_count: u64,
}

/// In-memory document store with replication bookkeeping and failure
/// injection, for exercising executor and orchestration flows.
pub struct MemoryStore {
    state: Mutex<HashMap<String, DocState>>,
    /// Mutating calls allowed before injected failures begin
    fail_after: Mutex<Option<u64>>,
    mutations_done: Mutex<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            fail_after: Mutex::new(None),
            mutations_done: Mutex::new(0),
        }
    }

    pub fn with_document(document_id: &str, objects: Vec<CanvasObject>) -> Self {
        let store = Self::new();
        store.add_document(document_id, objects);
        store
    }

    pub fn add_document(&self, document_id: &str, objects: Vec<CanvasObject>) {
        self.state.lock().unwrap().insert(
            document_id.to_string(),
            DocState {
                size: CanvasSize::default(),
                objects,
                selected: Vec::new(),
                suspended: false,
                pending_writes: 0,
                replicated_writes: 0,
                suspend_count: 0,
                flush_count: 0,
            },
        );
    }

    pub fn select(&self, document_id: &str, ids: &[&str]) {
        if let Some(doc) = self.state.lock().unwrap().get_mut(document_id) {
            doc.selected = ids.iter().map(|s| s.to_string()).collect();
        }
    }

    /// Allow `count` mutating calls, then fail every subsequent one
    pub fn fail_mutations_after(&self, count: u64) {
        *self.fail_after.lock().unwrap() = Some(count);
    }

    pub fn mutation_count(&self) -> u64 {
        *self.mutations_done.lock().unwrap()
    }

    pub fn suspend_count(&self, document_id: &str) -> u64 {
        self.state.lock().unwrap()[document_id].suspend_count
    }

    pub fn flush_count(&self, document_id: &str) -> u64 {
        self.state.lock().unwrap()[document_id].flush_count
    }

    pub fn replicated_writes(&self, document_id: &str) -> u64 {
        self.state.lock().unwrap()[document_id].replicated_writes
    }

    fn check_failure_injection(&self) -> Result<(), StoreError> {
        let mut done = self.mutations_done.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap()
            && *done >= limit
        {
            return Err(StoreError::Backend("injected failure".to_string()));
        }
        *done += 1;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn record_write(doc: &mut DocState) {
    if doc.suspended {
        doc.pending_writes += 1;
    } else {
        doc.replicated_writes += 1;
    }
}

#[async_trait]
impl DocumentStorePort for MemoryStore {
    async fn read_snapshot(&self, document_id: &str) -> Result<DocumentSnapshot, StoreError> {
        let state = self.state.lock().unwrap();
        let doc = state
            .get(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        Ok(DocumentSnapshot {
            document_id: document_id.to_string(),
            size: doc.size,
            objects: doc.objects.clone(),
            selected_ids: doc.selected.clone(),
        })
    }

    async fn live_object_ids(&self, document_id: &str) -> Result<HashSet<String>, StoreError> {
        let state = self.state.lock().unwrap();
        let doc = state
            .get(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        Ok(doc.objects.iter().map(|o| o.id.clone()).collect())
    }

    async fn create_object(
        &self,
        document_id: &str,
        object: CanvasObject,
    ) -> Result<(), StoreError> {
        self.check_failure_injection()?;
        let mut state = self.state.lock().unwrap();
        let doc = state
            .get_mut(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        doc.objects.push(object);
        record_write(doc);
        Ok(())
    }

    async fn apply_mutation(
        &self,
        document_id: &str,
        object_id: &str,
        patch: easel_domain::ObjectPatch,
    ) -> Result<(), StoreError> {
        self.check_failure_injection()?;
        let mut state = self.state.lock().unwrap();
        let doc = state
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
        record_write(doc);
        Ok(())
    }

    async fn delete_object(&self, document_id: &str, object_id: &str) -> Result<(), StoreError> {
        self.check_failure_injection()?;
        let mut state = self.state.lock().unwrap();
        let doc = state
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
        record_write(doc);
        Ok(())
    }

    async fn suspend_replication(&self, document_id: &str) {
        if let Some(doc) = self.state.lock().unwrap().get_mut(document_id) {
            doc.suspended = true;
            doc.suspend_count += 1;
        }
    }

    async fn flush_replication(&self, document_id: &str) {
        if let Some(doc) = self.state.lock().unwrap().get_mut(document_id) {
            doc.suspended = false;
            doc.flush_count += 1;
            if doc.pending_writes > 0 {
                doc.pending_writes = 0;
                // One consolidated outward write
                doc.replicated_writes += 1;
            }
        }
    }
}
