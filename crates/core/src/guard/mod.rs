//! Access guard for flag-gated operations
//!
//! An operation registered in the [`GuardRegistry`] only runs when its flag
//! evaluates to true for the calling principal. A rejection is
//! [`FlagwiseError::Unavailable`], which callers map to a "feature
//! unavailable" response, never to an authentication or permission failure.

pub mod registry;

use std::future::Future;
use std::sync::Arc;

use flagwise_domain::{FlagwiseError, Principal, Result};
use tracing::{debug, info};

pub use registry::GuardRegistry;

use crate::targeting::TargetingEngine;

/// Gate consulted uniformly at dispatch time.
#[derive(Clone)]
pub struct AccessGuard {
    engine: TargetingEngine,
    registry: Arc<GuardRegistry>,
}

impl AccessGuard {
    pub fn new(engine: TargetingEngine, registry: GuardRegistry) -> Self {
        Self { engine, registry: Arc::new(registry) }
    }

    /// Flag key required by `operation`, if it is guarded.
    pub fn required_flag(&self, operation: &str) -> Option<&str> {
        self.registry.required_flag(operation)
    }

    pub fn registry(&self) -> &GuardRegistry {
        &self.registry
    }

    /// Allow or reject `operation` for `principal`.
    ///
    /// Operations without a bound flag always pass.
    ///
    /// # Errors
    /// `Unavailable { flag_key }` when the bound flag is off for the
    /// principal; store failures propagate unchanged.
    pub async fn check(&self, operation: &str, principal: Option<&Principal>) -> Result<()> {
        let Some(flag_key) = self.registry.required_flag(operation) else {
            return Ok(());
        };

        if self.engine.is_enabled(flag_key, principal).await? {
            debug!(operation, flag_key, "guarded operation allowed");
            Ok(())
        } else {
            info!(
                operation,
                flag_key,
                principal_id = principal.map(|p| p.id.as_str()),
                "guarded operation rejected, feature unavailable"
            );
            Err(FlagwiseError::unavailable(flag_key))
        }
    }

    /// Run `operation_fut` only if `operation` is allowed for `principal`.
    ///
    /// The future is dropped unpolled on rejection.
    ///
    /// # Errors
    /// The guard's rejection, or whatever the operation itself returns.
    pub async fn run<F, T>(
        &self,
        operation: &str,
        principal: Option<&Principal>,
        operation_fut: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check(operation, principal).await?;
        operation_fut.await
    }
}
