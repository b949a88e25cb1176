//! Document store port
//!
//! The host document store collaborator: snapshot reads, patch-based
//! mutations, and replication control. The core never assumes synchronous
//! consistency between a snapshot read and a later mutation — every
//! reference is re-checked against [`live_object_ids`](DocumentStorePort::live_object_ids)
//! and every mutation can still fail with [`StoreError::ObjectNotFound`].

use async_trait::async_trait;
use easel_domain::{CanvasObject, DocumentSnapshot, ObjectPatch};
use std::collections::HashSet;
use thiserror::Error;

/// Errors from the document store collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Object {object_id} not found in document {document_id}")]
    ObjectNotFound {
        document_id: String,
        object_id: String,
    },

    #[error("Document store error: {0}")]
    Backend(String),
}

/// Port to the live document model.
///
/// Single-writer discipline: within this subsystem only the executor calls
/// the mutating methods, and the command queue guarantees one in-flight
/// command per document.
#[async_trait]
pub trait DocumentStorePort: Send + Sync {
    /// Immutable point-in-time read of the whole document
    async fn read_snapshot(&self, document_id: &str) -> Result<DocumentSnapshot, StoreError>;

    /// The live object id set (not the snapshot's)
    async fn live_object_ids(&self, document_id: &str) -> Result<HashSet<String>, StoreError>;

    /// Insert a new object
    async fn create_object(
        &self,
        document_id: &str,
        object: CanvasObject,
    ) -> Result<(), StoreError>;

    /// Apply a partial update to one object
    async fn apply_mutation(
        &self,
        document_id: &str,
        object_id: &str,
        patch: ObjectPatch,
    ) -> Result<(), StoreError>;

    /// Remove an object
    async fn delete_object(&self, document_id: &str, object_id: &str) -> Result<(), StoreError>;

    /// Stop replicating intermediate states outward until the next flush
    async fn suspend_replication(&self, document_id: &str);

    /// Re-enable replication with one consolidated outward write
    async fn flush_replication(&self, document_id: &str);
}
