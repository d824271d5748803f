//! Conversions from external infrastructure errors into domain errors.

use flagwise_domain::FlagwiseError;
use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FlagwiseError);

impl From<InfraError> for FlagwiseError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FlagwiseError> for InfraError {
    fn from(value: FlagwiseError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoFlagwiseError {
    fn into_flagwise(self) -> FlagwiseError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → FlagwiseError */
/* -------------------------------------------------------------------------- */

/// `SQLITE_CONSTRAINT_UNIQUE`
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// `SQLITE_CONSTRAINT_PRIMARYKEY`
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
/// `SQLITE_CONSTRAINT_CHECK`
const SQLITE_CONSTRAINT_CHECK: i32 = 275;

impl IntoFlagwiseError for SqlError {
    fn into_flagwise(self) -> FlagwiseError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        FlagwiseError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        FlagwiseError::Database("database is locked".into())
                    }
                    (
                        ErrorCode::ConstraintViolation,
                        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY,
                    ) => FlagwiseError::Conflict(format!("unique constraint violation: {message}")),
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_CHECK) => {
                        FlagwiseError::Validation(format!("check constraint violation: {message}"))
                    }
                    _ => FlagwiseError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => FlagwiseError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                FlagwiseError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                FlagwiseError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                FlagwiseError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => FlagwiseError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => FlagwiseError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(value.into_flagwise())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → FlagwiseError */
/* -------------------------------------------------------------------------- */

impl IntoFlagwiseError for PoolError {
    fn into_flagwise(self) -> FlagwiseError {
        FlagwiseError::Database(format!("connection pool error: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        Self(value.into_flagwise())
    }
}

/* -------------------------------------------------------------------------- */
/* JoinError → FlagwiseError */
/* -------------------------------------------------------------------------- */

impl IntoFlagwiseError for JoinError {
    fn into_flagwise(self) -> FlagwiseError {
        if self.is_cancelled() {
            FlagwiseError::Internal("blocking task cancelled".into())
        } else {
            FlagwiseError::Internal(format!("blocking task failed: {self}"))
        }
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        Self(value.into_flagwise())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → FlagwiseError */
/* -------------------------------------------------------------------------- */

impl IntoFlagwiseError for serde_json::Error {
    fn into_flagwise(self) -> FlagwiseError {
        FlagwiseError::Database(format!("corrupt rule data: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(value.into_flagwise())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
