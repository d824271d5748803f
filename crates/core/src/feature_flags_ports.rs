//! Feature flag ports.
//!
//! The engine only ever reads flags through [`FlagStore`]. Mutations go
//! through [`FlagManagement`], which the admin surface and seeding use; the
//! engine never calls it.
//!
//! # Example
//!
//! ```no_run
//! use flagwise_core::FlagStore;
//!
//! async fn flag_exists(store: &impl FlagStore, key: &str) -> bool {
//!     matches!(store.find_by_key(key).await, Ok(Some(_)))
//! }
//! ```

use async_trait::async_trait;
use flagwise_domain::{Flag, FlagPatch, NewFlag, Result};

/// Read access to flag records.
///
/// Any backing store (relational, document, in-memory) satisfying these
/// signatures is acceptable.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Look up a flag by its unique key.
    ///
    /// This is the hot path called on every evaluation and must be indexed.
    /// A missing flag is `Ok(None)`; `Err` is reserved for store failures.
    async fn find_by_key(&self, key: &str) -> Result<Option<Flag>>;

    /// List every flag ordered by key.
    async fn find_all(&self) -> Result<Vec<Flag>>;
}

/// Mutation surface for flag records.
///
/// Implementations serialize concurrent writes to the same key themselves.
#[async_trait]
pub trait FlagManagement: FlagStore {
    /// Create a flag.
    ///
    /// # Errors
    /// `Conflict` if the key already exists, `Validation` for malformed input.
    async fn create(&self, new_flag: NewFlag) -> Result<Flag>;

    /// Read a flag by id.
    ///
    /// # Errors
    /// `NotFound` if the id is unknown.
    async fn find_by_id(&self, id: &str) -> Result<Flag>;

    /// Apply a partial update.
    ///
    /// # Errors
    /// `NotFound` if the id is unknown, `Conflict` if a rename collides with
    /// another flag's key, `Validation` for malformed input.
    async fn update(&self, id: &str, patch: FlagPatch) -> Result<Flag>;

    /// Flip the kill switch only.
    ///
    /// # Errors
    /// `NotFound` if the id is unknown.
    async fn toggle(&self, id: &str, is_enabled: bool) -> Result<Flag>;

    /// Delete a flag.
    ///
    /// # Errors
    /// `NotFound` if the id is unknown.
    async fn remove(&self, id: &str) -> Result<()>;
}
