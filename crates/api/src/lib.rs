//! # Flagwise App
//!
//! Application layer - commands, context and the `flagwise` binary.
//!
//! This crate contains:
//! - Feature flag commands (evaluation, admin, seeding, guard checks)
//! - Argument parsing and dispatch for the `flagwise` binary
//! - Application context (dependency injection)
//! - Tracing setup and command logging helpers
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Selects the flag store from configuration

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
