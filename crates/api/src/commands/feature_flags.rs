//! Feature flag commands
//!
//! Evaluation commands read through the targeting engine; admin commands go
//! through the management port. Every command is timed and logged by
//! [`execute_command`].

use std::collections::BTreeMap;
use std::path::Path;

use flagwise_core::Evaluation;
use flagwise_domain::{Flag, FlagDefinition, FlagPatch, FlagwiseError, NewFlag, Principal, Result};
use flagwise_infra::{seed_defaults, SeedFile, SeedReport};
use serde::Serialize;
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;
use crate::utils::logging::log_feature_flag_check;

/// Evaluation of one flag with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagExplanation {
    pub flag_key: String,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

/// Outcome of asking the access guard about an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardDecision {
    pub operation: String,
    /// `None` when the operation is not guarded
    pub flag_key: Option<String>,
    pub allowed: bool,
}

pub async fn check_flag(ctx: &AppContext, key: &str, principal: Option<&Principal>) -> Result<bool> {
    execute_command("feature_flags::check_flag", async {
        let enabled = ctx.engine.is_enabled(key, principal).await?;
        log_feature_flag_check(key, enabled, principal.is_some());
        Ok(enabled)
    })
    .await
}

/// Check several keys at once. The map holds every requested key.
pub async fn check_flags(
    ctx: &AppContext,
    keys: Vec<String>,
    principal: Option<&Principal>,
) -> Result<BTreeMap<String, bool>> {
    execute_command("feature_flags::check_flags", async {
        let results = ctx.batch.check_many(keys, principal).await?;
        Ok(results.into_iter().collect())
    })
    .await
}

pub async fn list_enabled_flags(
    ctx: &AppContext,
    principal: Option<&Principal>,
) -> Result<Vec<String>> {
    execute_command("feature_flags::list_enabled_flags", ctx.engine.enabled_keys(principal)).await
}

pub async fn explain_flag(
    ctx: &AppContext,
    key: &str,
    principal: Option<&Principal>,
) -> Result<FlagExplanation> {
    execute_command("feature_flags::explain_flag", async {
        let evaluation = ctx.engine.evaluate(key, principal).await?;
        Ok(FlagExplanation { flag_key: key.to_string(), evaluation })
    })
    .await
}

pub async fn list_flags(ctx: &AppContext) -> Result<Vec<Flag>> {
    execute_command("feature_flags::list_flags", ctx.flags.find_all()).await
}

/// # Errors
/// `NotFound` if no flag has `key`.
pub async fn get_flag(ctx: &AppContext, key: &str) -> Result<Flag> {
    execute_command("feature_flags::get_flag", flag_by_key(ctx, key)).await
}

pub async fn create_flag(ctx: &AppContext, definition: FlagDefinition) -> Result<Flag> {
    execute_command("feature_flags::create_flag", async {
        let new_flag = NewFlag::try_from(definition)?;
        ctx.flags.create(new_flag).await
    })
    .await
}

pub async fn update_flag(ctx: &AppContext, key: &str, patch: FlagPatch) -> Result<Flag> {
    execute_command("feature_flags::update_flag", async {
        let flag = flag_by_key(ctx, key).await?;
        ctx.flags.update(&flag.id, patch).await
    })
    .await
}

/// Flip the kill switch of `key`. Takes effect on the next evaluation.
pub async fn toggle_flag(ctx: &AppContext, key: &str, enabled: bool) -> Result<Flag> {
    info!(command = "feature_flags::toggle_flag", flag_key = key, enabled, "toggling feature flag");

    execute_command("feature_flags::toggle_flag", async {
        let flag = flag_by_key(ctx, key).await?;
        ctx.flags.toggle(&flag.id, enabled).await
    })
    .await
}

pub async fn delete_flag(ctx: &AppContext, key: &str) -> Result<()> {
    execute_command("feature_flags::delete_flag", async {
        let flag = flag_by_key(ctx, key).await?;
        ctx.flags.remove(&flag.id).await
    })
    .await
}

/// Create every flag in the seed file at `path` that does not exist yet.
pub async fn seed_flags(ctx: &AppContext, path: &Path) -> Result<SeedReport> {
    execute_command("feature_flags::seed_flags", async {
        let seed = SeedFile::load(path)?;
        seed_defaults(ctx.flags.as_ref(), seed.flags).await
    })
    .await
}

/// Ask the access guard whether `operation` may run for `principal`.
///
/// A rejection is reported as `allowed: false`; store failures are errors.
pub async fn authorize_operation(
    ctx: &AppContext,
    operation: &str,
    principal: Option<&Principal>,
) -> Result<GuardDecision> {
    execute_command("feature_flags::authorize_operation", async {
        let flag_key = ctx.guard.required_flag(operation).map(str::to_string);
        let allowed = match ctx.guard.check(operation, principal).await {
            Ok(()) => true,
            Err(FlagwiseError::Unavailable { .. }) => false,
            Err(err) => return Err(err),
        };
        Ok(GuardDecision { operation: operation.to_string(), flag_key, allowed })
    })
    .await
}

async fn flag_by_key(ctx: &AppContext, key: &str) -> Result<Flag> {
    ctx.flags
        .find_by_key(key)
        .await?
        .ok_or_else(|| FlagwiseError::NotFound(format!("feature flag '{key}'")))
}
