//! Shared helpers for commands and the binary

pub mod command_helpers;
pub mod logging;

pub use command_helpers::execute_command;
pub use logging::init_tracing;
