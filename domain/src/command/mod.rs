//! Command lifecycle model

pub mod entities;

pub use entities::{Command, CommandStatus, QueueEntry};
