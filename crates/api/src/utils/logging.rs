use std::time::Duration;

use flagwise_domain::{FlagwiseError, LogFormat, LoggingConfig, Result};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level`. Output goes to stderr so command
/// results on stdout stay machine readable.
///
/// # Errors
/// `Config` if the level directive is malformed or a subscriber is already
/// installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            FlagwiseError::Config(format!("invalid log level '{}': {e}", config.level))
        })?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format {
        LogFormat::Json => {
            registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
        }
        LogFormat::Pretty => {
            registry.with(fmt::layer().pretty().with_writer(std::io::stderr)).try_init()
        }
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| FlagwiseError::Config(format!("failed to install tracing subscriber: {e}")))
}

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"feature_flags::check_flag"`).
/// * `elapsed` - Duration the command execution took.
/// * `error_type` - Stable error label on failure, `None` on success.
///
/// Callers must avoid forwarding principal ids or roles in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error_type: Option<&str>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error_type {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(error_type) => {
            warn!(command, duration_ms, error_type, "command_execution_failure");
        }
    }
}

/// Log the outcome of a feature flag evaluation served to a caller.
#[inline]
pub fn log_feature_flag_check(flag_key: &str, is_enabled: bool, has_principal: bool) {
    info!(flag_key, is_enabled, has_principal, "feature_flag_evaluated");
}
