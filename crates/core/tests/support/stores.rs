//! Mock flag stores

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use flagwise_core::FlagStore;
use flagwise_domain::{Flag, FlagwiseError, Result as DomainResult};

/// In-memory mock for `FlagStore`.
///
/// Counts lookups so tests can assert dedupe and fan-out behaviour.
#[derive(Default, Clone)]
pub struct MockFlagStore {
    flags: Arc<RwLock<HashMap<String, Flag>>>,
    lookups: Arc<AtomicUsize>,
}

impl MockFlagStore {
    /// Create a new mock seeded with the provided flags.
    pub fn new(flags: impl IntoIterator<Item = Flag>) -> Self {
        let store = Self::default();
        for flag in flags {
            store.put(flag);
        }
        store
    }

    /// Insert or replace a flag by key.
    pub fn put(&self, flag: Flag) {
        self.flags.write().unwrap().insert(flag.key.clone(), flag);
    }

    /// Flip the kill switch of an existing flag.
    pub fn set_enabled(&self, key: &str, is_enabled: bool) {
        if let Some(flag) = self.flags.write().unwrap().get_mut(key) {
            flag.is_enabled = is_enabled;
        }
    }

    /// Number of `find_by_key` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlagStore for MockFlagStore {
    async fn find_by_key(&self, key: &str) -> DomainResult<Option<Flag>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.flags.read().unwrap().get(key).cloned())
    }

    async fn find_all(&self) -> DomainResult<Vec<Flag>> {
        Ok(self.flags.read().unwrap().values().cloned().collect())
    }
}

/// Store that fails every read, for error propagation tests.
#[derive(Default, Clone)]
pub struct FailingFlagStore;

#[async_trait]
impl FlagStore for FailingFlagStore {
    async fn find_by_key(&self, _key: &str) -> DomainResult<Option<Flag>> {
        Err(FlagwiseError::Database("connection refused".into()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Flag>> {
        Err(FlagwiseError::Database("connection refused".into()))
    }
}
