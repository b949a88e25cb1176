//! Use cases: the orchestration loop and the command boundary.

pub mod command_service;
pub mod process_command;

pub use command_service::{
    CommandError, CommandRequest, CommandResponse, CommandService, CommandSuccess,
};
pub use process_command::ProcessCommandUseCase;
