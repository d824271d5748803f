//! Command execution helpers
//!
//! Provides utilities to reduce boilerplate when implementing commands with
//! timing and logging.

use std::future::Future;
use std::time::Instant;

use flagwise_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Execute a command with automatic timing and logging
///
/// The outcome is logged with the command name, its duration and, on
/// failure, the error's stable label.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn list_flags(ctx: &AppContext) -> Result<Vec<Flag>> {
///     execute_command("feature_flags::list_flags", async {
///         ctx.flags.find_all().await
///     })
///     .await
/// }
/// ```
pub async fn execute_command<Fut, T>(command_name: &str, command: Fut) -> DomainResult<T>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command.await;

    let error_type = result.as_ref().err().map(|err| err.label());
    log_command_execution(command_name, start.elapsed(), error_type);

    result
}
