//! In-memory flag repository
//!
//! Default backend for tests, demos and single-process deployments. Flags
//! live in a map keyed by id with a secondary key index; both are guarded by
//! one `RwLock` so every mutation is atomic with respect to readers.

use std::collections::HashMap;

use async_trait::async_trait;
use flagwise_core::{FlagManagement, FlagStore};
use flagwise_domain::{Flag, FlagPatch, FlagwiseError, NewFlag, Result as DomainResult};
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
struct Catalog {
    by_id: HashMap<String, Flag>,
    /// key -> id
    key_index: HashMap<String, String>,
}

/// Flag repository held entirely in process memory.
#[derive(Default)]
pub struct InMemoryFlagRepository {
    catalog: RwLock<Catalog>,
}

impl InMemoryFlagRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored flags.
    pub fn len(&self) -> usize {
        self.catalog.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.read().by_id.is_empty()
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagRepository {
    async fn find_by_key(&self, key: &str) -> DomainResult<Option<Flag>> {
        let catalog = self.catalog.read();
        Ok(catalog.key_index.get(key).and_then(|id| catalog.by_id.get(id)).cloned())
    }

    async fn find_all(&self) -> DomainResult<Vec<Flag>> {
        let mut flags: Vec<Flag> = self.catalog.read().by_id.values().cloned().collect();
        flags.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(flags)
    }
}

#[async_trait]
impl FlagManagement for InMemoryFlagRepository {
    async fn create(&self, new_flag: NewFlag) -> DomainResult<Flag> {
        new_flag.validate()?;

        let flag = {
            let mut catalog = self.catalog.write();
            if catalog.key_index.contains_key(&new_flag.key) {
                return Err(FlagwiseError::Conflict(format!(
                    "flag key '{}' already exists",
                    new_flag.key
                )));
            }

            let flag = Flag::from_new(Uuid::now_v7().to_string(), new_flag, now());
            catalog.key_index.insert(flag.key.clone(), flag.id.clone());
            catalog.by_id.insert(flag.id.clone(), flag.clone());
            flag
        };

        info!(flag_id = %flag.id, flag_key = %flag.key, scope = %flag.scope(), "feature flag created");
        Ok(flag)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Flag> {
        self.catalog.read().by_id.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: &str, patch: FlagPatch) -> DomainResult<Flag> {
        patch.validate()?;

        let flag = {
            let mut catalog = self.catalog.write();
            let current_key =
                catalog.by_id.get(id).map(|flag| flag.key.clone()).ok_or_else(|| not_found(id))?;

            if let Some(new_key) = patch.new_key() {
                if new_key != current_key && catalog.key_index.contains_key(new_key) {
                    return Err(FlagwiseError::Conflict(format!(
                        "flag key '{new_key}' already exists"
                    )));
                }
            }

            let Catalog { by_id, key_index } = &mut *catalog;
            let flag = by_id.get_mut(id).ok_or_else(|| not_found(id))?;
            patch.apply(flag, now());

            if flag.key != current_key {
                key_index.remove(&current_key);
                key_index.insert(flag.key.clone(), flag.id.clone());
            }
            flag.clone()
        };

        info!(flag_id = %flag.id, flag_key = %flag.key, "feature flag updated");
        Ok(flag)
    }

    async fn toggle(&self, id: &str, is_enabled: bool) -> DomainResult<Flag> {
        let flag = {
            let mut catalog = self.catalog.write();
            let flag = catalog.by_id.get_mut(id).ok_or_else(|| not_found(id))?;
            flag.is_enabled = is_enabled;
            flag.updated_at = now();
            flag.clone()
        };

        info!(flag_id = %flag.id, flag_key = %flag.key, is_enabled, "feature flag toggled");
        Ok(flag)
    }

    async fn remove(&self, id: &str) -> DomainResult<()> {
        let removed = {
            let mut catalog = self.catalog.write();
            let flag = catalog.by_id.remove(id).ok_or_else(|| not_found(id))?;
            catalog.key_index.remove(&flag.key);
            flag
        };

        info!(flag_id = %removed.id, flag_key = %removed.key, "feature flag removed");
        Ok(())
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn not_found(id: &str) -> FlagwiseError {
    FlagwiseError::NotFound(format!("feature flag '{id}'"))
}
