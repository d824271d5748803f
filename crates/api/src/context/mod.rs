//! Application context - dependency injection container

use std::sync::Arc;

use flagwise_core::{AccessGuard, BatchEvaluator, FlagManagement, FlagStore, GuardRegistry, TargetingEngine};
use flagwise_domain::{Config, Result, StorageBackend};
use flagwise_infra::{config, CachedFlagService, DbManager, InMemoryFlagRepository, SqliteFlagRepository};
use tracing::info;

/// Type alias for the flag management port trait object
type DynFlagManagement = dyn FlagManagement + 'static;

/// Application context - holds the flag store and everything evaluated on top of it
pub struct AppContext {
    pub config: Config,
    /// Admin surface: create, update, toggle, remove
    pub flags: Arc<DynFlagManagement>,
    pub engine: TargetingEngine,
    pub batch: BatchEvaluator,
    pub guard: AccessGuard,
}

impl AppContext {
    /// Load configuration from the environment or a config file and wire
    /// up the configured store.
    ///
    /// # Errors
    /// Configuration, storage or guard registration failures.
    pub fn new() -> Result<Self> {
        let config = config::load()?;
        Self::from_config(config)
    }

    /// Wire up the store selected by `config.storage`.
    ///
    /// For SQLite this opens the pool, applies migrations and runs a health
    /// check before anything is evaluated.
    ///
    /// # Errors
    /// Storage initialisation failures or an invalid guard table.
    pub fn from_config(config: Config) -> Result<Self> {
        match config.storage.backend {
            StorageBackend::Memory => {
                Self::with_optional_cache(config, Arc::new(InMemoryFlagRepository::new()))
            }
            StorageBackend::Sqlite => {
                let db = Arc::new(DbManager::new(&config.storage.path, config.storage.pool_size)?);
                db.run_migrations()?;
                db.health_check()?;
                Self::with_optional_cache(config, Arc::new(SqliteFlagRepository::new(db)))
            }
        }
    }

    /// Build a context around an already constructed store.
    ///
    /// The cache setting in `config` is not applied here; wrap `store` in a
    /// [`CachedFlagService`] first if needed.
    ///
    /// # Errors
    /// `Validation` or `Conflict` from the guard table in `config.guards`.
    pub fn with_store<S>(config: Config, store: Arc<S>) -> Result<Self>
    where
        S: FlagManagement + 'static,
    {
        let reader: Arc<dyn FlagStore> = Arc::clone(&store) as Arc<dyn FlagStore>;
        let flags: Arc<DynFlagManagement> = store;

        let engine = TargetingEngine::new(reader);
        let batch =
            BatchEvaluator::new(engine.clone()).with_max_keys(config.evaluation.max_batch_keys);
        let registry = GuardRegistry::from_bindings(config.guards.clone())?;
        let guard = AccessGuard::new(engine.clone(), registry);

        info!(
            backend = %config.storage.backend,
            cache_enabled = config.cache.enabled,
            max_batch_keys = batch.max_keys(),
            guarded_operations = guard.registry().len(),
            "application context initialised"
        );

        Ok(Self { config, flags, engine, batch, guard })
    }

    fn with_optional_cache<S>(config: Config, store: Arc<S>) -> Result<Self>
    where
        S: FlagManagement + 'static,
    {
        if config.cache.enabled {
            let cached = Arc::new(CachedFlagService::new(store, &config.cache));
            Self::with_store(config, cached)
        } else {
            Self::with_store(config, store)
        }
    }
}
