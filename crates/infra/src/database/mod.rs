//! Database implementations

pub mod flag_repository;
pub mod manager;

pub use flag_repository::SqliteFlagRepository;
pub use manager::{DbManager, SqliteConnection};
