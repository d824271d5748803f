//! Error types used throughout the workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Flagwise
///
/// "Flag missing" and "principal missing for a scoped flag" are never errors:
/// evaluation reports them as a disabled result. Only store failures and
/// management-layer problems surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FlagwiseError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A guarded operation was rejected because its flag evaluated to false.
    ///
    /// Signals product availability, not identity or permission denial.
    #[error("Feature unavailable: flag '{flag_key}' is not enabled")]
    Unavailable { flag_key: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlagwiseError {
    /// Build an [`FlagwiseError::Unavailable`] for the given flag key.
    pub fn unavailable(flag_key: impl Into<String>) -> Self {
        Self::Unavailable { flag_key: flag_key.into() }
    }

    /// Stable label suitable for metrics and structured logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation",
            Self::Unavailable { .. } => "feature_unavailable",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the error is caused by the caller's input rather than the system.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Conflict(_) | Self::Validation(_) | Self::Unavailable { .. }
        )
    }
}

/// Result type alias for Flagwise operations
pub type Result<T> = std::result::Result<T, FlagwiseError>;
