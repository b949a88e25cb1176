//! Domain layer for easel
//!
//! This crate contains the core business logic for turning natural-language
//! canvas commands into validated graphic operations. It has no dependencies
//! on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Digest**: a size-bounded summary of the canvas sent to the reasoning
//!   service, bounded independent of document size.
//! - **Operation catalog**: the fixed, schema-described set of mutations and
//!   queries the reasoning service may request. The registry here is the one
//!   schema source for both validation and the wire catalog.
//! - **Validated operation**: a tagged union keyed by operation name; raw
//!   key/value argument bags never cross the validator boundary.

pub mod canvas;
pub mod catalog;
pub mod command;
pub mod core;
pub mod digest;
pub mod operation;
pub mod prompt;
pub mod validation;

// Re-export commonly used types
pub use canvas::{CanvasObject, CanvasSize, DocumentSnapshot, ObjectKind, ObjectPatch};
pub use catalog::{
    CATALOG_VERSION, OperationKind, OperationRegistry, OperationSchema, ParamKind, ParamSchema,
    names,
};
pub use command::{Command, CommandStatus, QueueEntry};
pub use core::error::DomainError;
pub use digest::{
    Digest, DigestObject, FULL_DIGEST_THRESHOLD, RECENT_OBJECT_CAP, estimate_tokens,
    format_for_prompt, summarize,
};
pub use operation::{
    AlignEdge, DistributeAxis, ExecutionResult, OperationCall, ValidatedOperation,
    describe_failures,
};
pub use prompt::CanvasPromptTemplate;
pub use validation::{RejectedOperation, ValidationOutcome, validate_calls};
