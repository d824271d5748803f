//! Targeting engine - core evaluation logic

use std::sync::Arc;

use flagwise_domain::{Flag, Principal, Result, Targeting};
use tracing::{debug, error, warn};

use super::bucket::{in_rollout, rollout_bucket};
use super::evaluation::{Evaluation, EvaluationReason};
use crate::feature_flags_ports::FlagStore;

/// Decides whether a flag is enabled for an optional principal.
///
/// Holds nothing but the store handle; every call recomputes from current
/// store state, so the engine is safe to share across tasks and threads.
#[derive(Clone)]
pub struct TargetingEngine {
    store: Arc<dyn FlagStore>,
}

impl TargetingEngine {
    /// Create a new engine reading from `store`
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        Self { store }
    }

    /// Whether `key` is enabled for `principal`.
    ///
    /// A missing flag or a missing principal for a scoped flag yields
    /// `Ok(false)`.
    ///
    /// # Errors
    /// Propagates store failures only.
    pub async fn is_enabled(&self, key: &str, principal: Option<&Principal>) -> Result<bool> {
        Ok(self.evaluate(key, principal).await?.enabled)
    }

    /// Evaluate `key` for `principal`, keeping the reason for diagnostics.
    ///
    /// # Errors
    /// Propagates store failures only.
    pub async fn evaluate(&self, key: &str, principal: Option<&Principal>) -> Result<Evaluation> {
        let flag = self.store.find_by_key(key).await.map_err(|err| {
            error!(flag_key = key, error = %err, "flag lookup failed");
            err
        })?;

        let Some(flag) = flag else {
            warn!(flag_key = key, "feature flag not found, evaluating as disabled");
            return Ok(Evaluation::disabled(EvaluationReason::FlagNotFound));
        };

        let evaluation = evaluate_flag(&flag, principal);
        debug!(
            flag_key = key,
            scope = %flag.scope(),
            principal_id = principal.map(|p| p.id.as_str()),
            enabled = evaluation.enabled,
            reason = ?evaluation.reason,
            "feature flag evaluated"
        );
        Ok(evaluation)
    }

    /// Keys of every flag enabled for `principal`, sorted.
    ///
    /// Linear in the size of the catalog.
    ///
    /// # Errors
    /// Propagates store failures only.
    pub async fn enabled_keys(&self, principal: Option<&Principal>) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .store
            .find_all()
            .await?
            .into_iter()
            .filter(|flag| evaluate_flag(flag, principal).enabled)
            .map(|flag| flag.key)
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }
}

/// Evaluate a single flag record. Pure.
pub fn evaluate_flag(flag: &Flag, principal: Option<&Principal>) -> Evaluation {
    if !flag.is_enabled {
        return Evaluation::disabled(EvaluationReason::KillSwitch);
    }

    if matches!(flag.targeting, Targeting::Global) {
        return Evaluation::enabled(EvaluationReason::Global);
    }

    let Some(principal) = principal else {
        return Evaluation::disabled(EvaluationReason::PrincipalRequired);
    };

    match &flag.targeting {
        Targeting::Global => Evaluation::enabled(EvaluationReason::Global),
        Targeting::User { ids } => {
            if ids.contains(&principal.id) {
                Evaluation::enabled(EvaluationReason::UserListed)
            } else {
                Evaluation::disabled(EvaluationReason::UserNotListed)
            }
        }
        Targeting::Role { names } => {
            if principal.has_any_role(names) {
                Evaluation::enabled(EvaluationReason::RoleMatched)
            } else {
                Evaluation::disabled(EvaluationReason::NoRoleMatched)
            }
        }
        Targeting::Percentage { rollout_percentage } => {
            let bucket = rollout_bucket(&principal.id, &flag.key);
            if in_rollout(bucket, *rollout_percentage) {
                Evaluation::enabled(EvaluationReason::RolloutIncluded { bucket })
            } else {
                Evaluation::disabled(EvaluationReason::RolloutExcluded { bucket })
            }
        }
    }
}
