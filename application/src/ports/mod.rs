//! Ports: interfaces between the application layer and the outside world.
//!
//! Implementations (adapters) live in the infrastructure layer.

pub mod catalog_schema;
pub mod command_log;
pub mod document_store;
pub mod processor;
pub mod queue_observer;
pub mod reasoning;

pub use catalog_schema::CatalogSchemaPort;
pub use command_log::{CommandLogEvent, CommandLogPort, NoCommandLog};
pub use document_store::{DocumentStorePort, StoreError};
pub use processor::{
    CommandFailure, CommandJob, CommandProcessor, CommandVerdict, ErrorKind,
};
pub use queue_observer::{NoQueueObserver, QueueObserverPort, QueueSnapshot};
pub use reasoning::{
    GatewayError, IterationRecord, ReasoningBackend, ReasoningReply, ReasoningRequest, Role,
    TokenUsage, ToolOutcome, TranscriptMessage,
};
