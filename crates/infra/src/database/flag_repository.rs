//! SQLite-backed flag repository.
//!
//! Implements `FlagStore` and `FlagManagement` on the `feature_flags` table.
//! All database operations run in `spawn_blocking` to avoid blocking the
//! async runtime. Mutations run inside immediate transactions so concurrent
//! writers to the same key are serialized by SQLite.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use flagwise_core::{FlagManagement, FlagStore};
use flagwise_domain::{
    Flag, FlagPatch, FlagScope, FlagwiseError, NewFlag, Result as DomainResult, RolloutPercentage,
    Targeting,
};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tokio::task;
use tracing::info;
use uuid::Uuid;

use super::manager::{map_sql_error, DbManager};
use crate::errors::InfraError;

const SELECT_FLAG: &str = "SELECT id, key, display_name, description, is_enabled, scope,
        user_ids_json, roles_json, rollout_percentage, created_at, updated_at
     FROM feature_flags";

/// SQLite-backed flag repository.
pub struct SqliteFlagRepository {
    db: Arc<DbManager>,
}

impl SqliteFlagRepository {
    /// Create a new repository with the given database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn run_blocking<T, F>(&self, operation: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> DomainResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let mut conn = db.get_connection()?;
            operation(&mut conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl FlagStore for SqliteFlagRepository {
    async fn find_by_key(&self, key: &str) -> DomainResult<Option<Flag>> {
        let key = key.to_string();
        self.run_blocking(move |conn| query_by_key(conn, &key)).await
    }

    async fn find_all(&self) -> DomainResult<Vec<Flag>> {
        self.run_blocking(|conn| query_all(conn)).await
    }
}

#[async_trait]
impl FlagManagement for SqliteFlagRepository {
    async fn create(&self, new_flag: NewFlag) -> DomainResult<Flag> {
        new_flag.validate()?;
        let flag = Flag::from_new(Uuid::now_v7().to_string(), new_flag, now());

        let created = self
            .run_blocking(move |conn| {
                insert_flag(conn, &flag).map_err(|err| key_conflict(err, &flag.key))?;
                Ok(flag)
            })
            .await?;

        info!(
            flag_id = %created.id,
            flag_key = %created.key,
            scope = %created.scope(),
            is_enabled = created.is_enabled,
            "feature flag created"
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Flag> {
        let id = id.to_string();
        self.run_blocking(move |conn| query_by_id(conn, &id)?.ok_or_else(|| not_found(&id)))
            .await
    }

    async fn update(&self, id: &str, patch: FlagPatch) -> DomainResult<Flag> {
        patch.validate()?;
        let id = id.to_string();

        let updated = self
            .run_blocking(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(map_sql_error)?;

                let mut flag = query_by_id(&tx, &id)?.ok_or_else(|| not_found(&id))?;
                if let Some(new_key) = patch.new_key() {
                    if new_key != flag.key && query_by_key(&tx, new_key)?.is_some() {
                        return Err(FlagwiseError::Conflict(format!(
                            "flag key '{new_key}' already exists"
                        )));
                    }
                }

                patch.apply(&mut flag, now());
                update_flag(&tx, &flag).map_err(|err| key_conflict(err, &flag.key))?;
                tx.commit().map_err(map_sql_error)?;
                Ok(flag)
            })
            .await?;

        info!(flag_id = %updated.id, flag_key = %updated.key, "feature flag updated");
        Ok(updated)
    }

    async fn toggle(&self, id: &str, is_enabled: bool) -> DomainResult<Flag> {
        let id = id.to_string();

        let toggled = self
            .run_blocking(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(map_sql_error)?;

                let changed = tx
                    .execute(
                        "UPDATE feature_flags SET is_enabled = ?1, updated_at = ?2 WHERE id = ?3",
                        params![is_enabled, now(), id],
                    )
                    .map_err(map_sql_error)?;
                if changed == 0 {
                    return Err(not_found(&id));
                }

                let flag = query_by_id(&tx, &id)?.ok_or_else(|| not_found(&id))?;
                tx.commit().map_err(map_sql_error)?;
                Ok(flag)
            })
            .await?;

        info!(
            flag_id = %toggled.id,
            flag_key = %toggled.key,
            is_enabled = toggled.is_enabled,
            "feature flag toggled"
        );
        Ok(toggled)
    }

    async fn remove(&self, id: &str) -> DomainResult<()> {
        let id = id.to_string();

        let removed_id = self
            .run_blocking(move |conn| {
                let changed = conn
                    .execute("DELETE FROM feature_flags WHERE id = ?1", params![id])
                    .map_err(map_sql_error)?;
                if changed == 0 {
                    return Err(not_found(&id));
                }
                Ok(id)
            })
            .await?;

        info!(flag_id = %removed_id, "feature flag removed");
        Ok(())
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn query_by_key(conn: &Connection, key: &str) -> DomainResult<Option<Flag>> {
    conn.query_row(&format!("{SELECT_FLAG} WHERE key = ?1"), params![key], FlagRow::from_row)
        .optional()
        .map_err(map_sql_error)?
        .map(FlagRow::into_flag)
        .transpose()
}

fn query_by_id(conn: &Connection, id: &str) -> DomainResult<Option<Flag>> {
    conn.query_row(&format!("{SELECT_FLAG} WHERE id = ?1"), params![id], FlagRow::from_row)
        .optional()
        .map_err(map_sql_error)?
        .map(FlagRow::into_flag)
        .transpose()
}

fn query_all(conn: &Connection) -> DomainResult<Vec<Flag>> {
    let mut stmt = conn.prepare(&format!("{SELECT_FLAG} ORDER BY key")).map_err(map_sql_error)?;
    let rows = stmt
        .query_map(params![], FlagRow::from_row)
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(map_sql_error)?;

    rows.into_iter().map(FlagRow::into_flag).collect()
}

fn insert_flag(conn: &Connection, flag: &Flag) -> DomainResult<()> {
    let columns = TargetingColumns::encode(&flag.targeting)?;
    conn.execute(
        "INSERT INTO feature_flags (
            id, key, display_name, description, is_enabled, scope,
            user_ids_json, roles_json, rollout_percentage, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            flag.id,
            flag.key,
            flag.display_name,
            flag.description,
            flag.is_enabled,
            columns.scope,
            columns.user_ids_json,
            columns.roles_json,
            columns.rollout_percentage,
            flag.created_at,
            flag.updated_at,
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn update_flag(conn: &Connection, flag: &Flag) -> DomainResult<()> {
    let columns = TargetingColumns::encode(&flag.targeting)?;
    conn.execute(
        "UPDATE feature_flags SET
            key = ?2, display_name = ?3, description = ?4, is_enabled = ?5, scope = ?6,
            user_ids_json = ?7, roles_json = ?8, rollout_percentage = ?9, updated_at = ?10
         WHERE id = ?1",
        params![
            flag.id,
            flag.key,
            flag.display_name,
            flag.description,
            flag.is_enabled,
            columns.scope,
            columns.user_ids_json,
            columns.roles_json,
            columns.rollout_percentage,
            flag.updated_at,
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

// ============================================================================
// Row Mapping
// ============================================================================

/// Raw `feature_flags` row.
struct FlagRow {
    id: String,
    key: String,
    display_name: String,
    description: Option<String>,
    is_enabled: bool,
    scope: String,
    user_ids_json: Option<String>,
    roles_json: Option<String>,
    rollout_percentage: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl FlagRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: row.get(1)?,
            display_name: row.get(2)?,
            description: row.get(3)?,
            is_enabled: row.get(4)?,
            scope: row.get(5)?,
            user_ids_json: row.get(6)?,
            roles_json: row.get(7)?,
            rollout_percentage: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_flag(self) -> DomainResult<Flag> {
        let scope: FlagScope = self.scope.parse().map_err(|err: String| {
            FlagwiseError::Database(format!("flag '{}' has corrupt scope: {err}", self.key))
        })?;

        let targeting = match scope {
            FlagScope::Global => Targeting::Global,
            FlagScope::User => Targeting::User { ids: decode_set(self.user_ids_json.as_deref())? },
            FlagScope::Role => Targeting::Role { names: decode_set(self.roles_json.as_deref())? },
            FlagScope::Percentage => Targeting::Percentage {
                rollout_percentage: RolloutPercentage::new(self.rollout_percentage.unwrap_or(0))
                    .map_err(|err| {
                        FlagwiseError::Database(format!("flag '{}': {err}", self.key))
                    })?,
            },
        };

        Ok(Flag {
            id: self.id,
            key: self.key,
            display_name: self.display_name,
            description: self.description,
            is_enabled: self.is_enabled,
            targeting,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Column values that persist a [`Targeting`].
struct TargetingColumns {
    scope: &'static str,
    user_ids_json: Option<String>,
    roles_json: Option<String>,
    rollout_percentage: Option<i64>,
}

impl TargetingColumns {
    fn encode(targeting: &Targeting) -> DomainResult<Self> {
        let mut columns = Self {
            scope: targeting.scope().as_str(),
            user_ids_json: None,
            roles_json: None,
            rollout_percentage: None,
        };

        match targeting {
            Targeting::Global => {}
            Targeting::User { ids } => columns.user_ids_json = Some(encode_set(ids)?),
            Targeting::Role { names } => columns.roles_json = Some(encode_set(names)?),
            Targeting::Percentage { rollout_percentage } => {
                columns.rollout_percentage = Some(i64::from(rollout_percentage.value()));
            }
        }
        Ok(columns)
    }
}

fn encode_set(values: &BTreeSet<String>) -> DomainResult<String> {
    serde_json::to_string(values).map_err(|err| InfraError::from(err).into())
}

fn decode_set(raw: Option<&str>) -> DomainResult<BTreeSet<String>> {
    raw.map_or_else(
        || Ok(BTreeSet::new()),
        |json| serde_json::from_str(json).map_err(|err| InfraError::from(err).into()),
    )
}

// ============================================================================
// Error Mapping
// ============================================================================

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn not_found(id: &str) -> FlagwiseError {
    FlagwiseError::NotFound(format!("feature flag '{id}'"))
}

/// Replace a raw unique-constraint message with one naming the key.
fn key_conflict(err: FlagwiseError, key: &str) -> FlagwiseError {
    match err {
        FlagwiseError::Conflict(_) => {
            FlagwiseError::Conflict(format!("flag key '{key}' already exists"))
        }
        other => other,
    }
}

/// Map JoinError from spawn_blocking to FlagwiseError.
fn map_join_error(err: task::JoinError) -> FlagwiseError {
    InfraError::from(err).into()
}

// ============================================================================
// Tests
// ============================================================================
