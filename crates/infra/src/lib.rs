//! # Flagwise Infrastructure
//!
//! Infrastructure implementations of core flag ports.
//!
//! This crate contains:
//! - Flag stores (in-memory and SQLite)
//! - A read-through cache in front of any store
//! - Configuration loading from environment and files
//! - Seeding flags from definition files
//!
//! ## Architecture
//! - Implements traits defined in `flagwise-core`
//! - Depends on `flagwise-domain` and `flagwise-core`
//! - Contains all "impure" code (I/O, clocks, id generation)

pub mod config;
pub mod database;
pub mod errors;
pub mod memory;
pub mod seed;
pub mod services;

// Re-export commonly used items
pub use database::{DbManager, SqliteFlagRepository};
pub use errors::InfraError;
pub use memory::InMemoryFlagRepository;
pub use seed::{seed_defaults, SeedFile, SeedReport};
pub use services::CachedFlagService;
