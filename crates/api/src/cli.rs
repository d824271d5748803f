//! Command line interface of the `flagwise` binary
//!
//! ```text
//! flagwise check <key> [--user ID] [--roles a,b]
//! flagwise check-many <k1,k2,..> [--user ID] [--roles a,b]
//! flagwise enabled [--user ID] [--roles a,b]
//! flagwise explain <key> [--user ID] [--roles a,b]
//! flagwise list
//! flagwise toggle <key> <on|off>
//! flagwise seed <file>
//! flagwise guard <operation> [--user ID] [--roles a,b]
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use flagwise_domain::{FlagwiseError, Principal, Result};
use serde::Serialize;
use serde_json::{json, Value};

use crate::commands;
use crate::context::AppContext;

/// Flagwise feature flag targeting.
#[derive(Debug, Parser)]
#[command(
    name = "flagwise",
    version,
    about = "Feature flag targeting and evaluation",
    after_help = "Without --user, scoped flags evaluate as disabled."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Caller identity for evaluating commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct PrincipalArgs {
    /// Principal id; omit to evaluate anonymously
    #[arg(long, value_name = "ID", value_parser = non_empty)]
    pub user: Option<String>,

    /// Comma-separated roles of the principal
    #[arg(long, value_name = "ROLES", value_delimiter = ',', requires = "user")]
    pub roles: Vec<String>,
}

impl PrincipalArgs {
    /// `None` when no `--user` was given.
    pub fn principal(&self) -> Option<Principal> {
        let roles = self.roles.iter().map(|role| role.trim()).filter(|role| !role.is_empty());
        self.user.as_ref().map(|id| Principal::new(id.as_str()).with_roles(roles))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToggleState {
    On,
    Off,
}

impl ToggleState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Whether a flag is enabled for the principal
    Check {
        key: String,
        #[command(flatten)]
        principal: PrincipalArgs,
    },

    /// Check several flags at once
    CheckMany {
        /// Comma-separated flag keys
        #[arg(value_name = "K1,K2,..", value_delimiter = ',', required = true)]
        keys: Vec<String>,
        #[command(flatten)]
        principal: PrincipalArgs,
    },

    /// List every flag enabled for the principal
    Enabled {
        #[command(flatten)]
        principal: PrincipalArgs,
    },

    /// Evaluate a flag and show the reason
    Explain {
        key: String,
        #[command(flatten)]
        principal: PrincipalArgs,
    },

    /// List all flag records
    List,

    /// Flip a flag's kill switch
    Toggle {
        key: String,
        #[arg(value_enum)]
        state: ToggleState,
    },

    /// Create missing flags from a TOML or JSON file
    Seed { file: PathBuf },

    /// Whether a guarded operation may run
    Guard {
        operation: String,
        #[command(flatten)]
        principal: PrincipalArgs,
    },
}

/// Run `command` against `ctx` and return its JSON output.
///
/// # Errors
/// Whatever the underlying command returns.
pub async fn execute(ctx: &AppContext, command: Command) -> Result<Value> {
    match command {
        Command::Check { key, principal } => {
            let enabled = commands::check_flag(ctx, &key, principal.principal().as_ref()).await?;
            Ok(json!({ "flag_key": key, "enabled": enabled }))
        }
        Command::CheckMany { keys, principal } => {
            let keys = keys.into_iter().filter(|key| !key.trim().is_empty()).collect();
            to_json(&commands::check_flags(ctx, keys, principal.principal().as_ref()).await?)
        }
        Command::Enabled { principal } => {
            to_json(&commands::list_enabled_flags(ctx, principal.principal().as_ref()).await?)
        }
        Command::Explain { key, principal } => {
            to_json(&commands::explain_flag(ctx, &key, principal.principal().as_ref()).await?)
        }
        Command::List => to_json(&commands::list_flags(ctx).await?),
        Command::Toggle { key, state } => {
            to_json(&commands::toggle_flag(ctx, &key, state.is_on()).await?)
        }
        Command::Seed { file } => to_json(&commands::seed_flags(ctx, &file).await?),
        Command::Guard { operation, principal } => {
            let principal = principal.principal();
            to_json(&commands::authorize_operation(ctx, &operation, principal.as_ref()).await?)
        }
    }
}

fn non_empty(value: &str) -> std::result::Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| FlagwiseError::Internal(format!("failed to serialize output: {e}")))
}
