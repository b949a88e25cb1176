//! Application layer for easel
//!
//! Ports and use cases for the AI command orchestration pipeline: the
//! reasoning client with its retry policy, the per-document command queue,
//! the operation executor, and the orchestration loop that drives one
//! command through summarize → reason → validate → execute.

pub mod config;
pub mod executor;
pub mod gateway;
pub mod ports;
pub mod queue;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use config::OrchestratorParams;
pub use executor::{AGENT_AUTHOR, DEFAULT_PACING, OperationExecutor};
pub use gateway::{MAX_ATTEMPTS, ReasoningClient};
pub use ports::{
    CatalogSchemaPort, CommandFailure, CommandJob, CommandLogEvent, CommandLogPort,
    CommandProcessor, CommandVerdict, DocumentStorePort, ErrorKind, GatewayError, IterationRecord,
    NoCommandLog, NoQueueObserver, QueueObserverPort, QueueSnapshot, ReasoningBackend,
    ReasoningReply, ReasoningRequest, Role, StoreError, TokenUsage, ToolOutcome,
    TranscriptMessage,
};
pub use queue::{CommandOutcome, CommandQueue, QueueConfig, QueueError};
pub use use_cases::{
    CommandError, CommandRequest, CommandResponse, CommandService, CommandSuccess,
    ProcessCommandUseCase,
};
