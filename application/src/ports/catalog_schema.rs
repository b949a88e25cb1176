//! Catalog schema port
//!
//! Renders the domain operation registry into the wire tool definitions
//! attached to reasoning calls. The registry is the single schema source;
//! this port is its outward-facing view, so validator and catalog stay in
//! lock-step by construction.

use easel_domain::{OperationRegistry, OperationSchema};

/// Converts operation schemas to provider wire format.
pub trait CatalogSchemaPort: Send + Sync {
    /// Render one operation schema
    fn operation_to_schema(&self, op: &OperationSchema) -> serde_json::Value;

    /// Render the whole registry, in stable (name) order
    fn catalog_schema(&self, registry: &OperationRegistry) -> Vec<serde_json::Value> {
        registry.all().map(|op| self.operation_to_schema(op)).collect()
    }
}
