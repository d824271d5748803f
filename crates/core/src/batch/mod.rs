//! Batch evaluation
//!
//! Evaluates a bounded set of flag keys against one principal. Keys are
//! independent and read-only, so they are dispatched concurrently.

use std::collections::{BTreeSet, HashMap};

use flagwise_domain::constants::DEFAULT_MAX_BATCH_KEYS;
use flagwise_domain::{FlagwiseError, Principal, Result};
use futures::future::try_join_all;
use tracing::debug;

use crate::targeting::TargetingEngine;

/// Evaluates many keys for one principal.
#[derive(Clone)]
pub struct BatchEvaluator {
    engine: TargetingEngine,
    max_keys: usize,
}

impl BatchEvaluator {
    /// Create an evaluator with the default fan-out cap.
    pub fn new(engine: TargetingEngine) -> Self {
        Self { engine, max_keys: DEFAULT_MAX_BATCH_KEYS }
    }

    /// Override the maximum number of distinct keys per call.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys.max(1);
        self
    }

    pub const fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Evaluate every key in `keys` for `principal`.
    ///
    /// Duplicate keys are evaluated once. Every requested key is present in
    /// the result; unknown keys map to `false`.
    ///
    /// # Errors
    /// `Validation` when more than `max_keys` distinct keys are requested.
    /// A store failure on any key fails the whole batch.
    pub async fn check_many<I, S>(
        &self,
        keys: I,
        principal: Option<&Principal>,
    ) -> Result<HashMap<String, bool>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        if keys.len() > self.max_keys {
            return Err(FlagwiseError::Validation(format!(
                "batch check accepts at most {} keys, got {}",
                self.max_keys,
                keys.len()
            )));
        }

        let checks = keys.into_iter().map(|key| async move {
            let enabled = self.engine.is_enabled(&key, principal).await?;
            Ok::<_, FlagwiseError>((key, enabled))
        });
        let results: HashMap<String, bool> = try_join_all(checks).await?.into_iter().collect();

        debug!(
            key_count = results.len(),
            enabled_count = results.values().filter(|enabled| **enabled).count(),
            "batch flag check completed"
        );
        Ok(results)
    }
}
