//! # Flagwise Domain
//!
//! Feature flag domain types for Flagwise.
//!
//! This crate contains:
//! - Flag records, targeting rules and principals
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Input validation for flag definitions
//!
//! ## Architecture
//! - No dependencies on other Flagwise crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
