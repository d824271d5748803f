//! Shared fixtures for `flagwise-infra` integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use flagwise_domain::{NewFlag, Targeting};
use flagwise_infra::database::DbManager;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("flags.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// One enabled flag per scope, keyed like the reference scenarios.
pub fn scenario_flags() -> Vec<NewFlag> {
    vec![
        NewFlag::new("x", "Global switch", Targeting::Global).with_enabled(true),
        NewFlag::new("y", "Half rollout", Targeting::percentage(50).expect("valid percentage"))
            .with_enabled(true),
        NewFlag::new("z", "Admin tools", Targeting::roles(["admin"])).with_enabled(true),
        NewFlag::new("beta", "Beta testers", Targeting::users(["42", "7"])).with_enabled(true),
    ]
}
