//! SQLite-backed activity log repository.
//!
//! Implements the `ActivityLog` port: appends rows and serves the
//! filtered, newest-first page reads behind the global feed and the
//! per-entity timelines. The actor's display name is resolved with a
//! LEFT JOIN against profiles at query time.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use salesdesk_core::feed::ports::ActivityLog;
use salesdesk_domain::{
    ActivityFilters, ActivityRecord, EntityKind, NewActivity, Result, SalesdeskError,
};
use tokio::task;
use uuid::Uuid;

use super::manager::DbManager;
use super::rows::{datetime_column, page_offset};
use crate::errors::InfraError;

/// Activity log backed by SQLite.
pub struct SqliteActivityRepository {
    db: Arc<DbManager>,
}

impl SqliteActivityRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityLog for SqliteActivityRepository {
    async fn list(
        &self,
        filters: &ActivityFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<ActivityRecord>, u64)> {
        let db = Arc::clone(&self.db);
        let filters = filters.clone();
        task::spawn_blocking(move || -> Result<(Vec<ActivityRecord>, u64)> {
            let conn = db.get_connection()?;
            // The source filter applies to the resolved label and is handled
            // after enrichment; only storage-side filters are pushed down.
            let (where_sql, filter_params) = build_filter(&filters);

            let count_sql = format!("SELECT COUNT(*) FROM activity_log a{where_sql}");
            let total: i64 = conn
                .query_row(&count_sql, params_from_iter(filter_params.clone()), |row| row.get(0))
                .map_err(map_sql_error)?;

            let page_sql = format!(
                "{ACTIVITY_SELECT}{where_sql} ORDER BY a.timestamp DESC LIMIT ? OFFSET ?"
            );
            let mut page_params = filter_params;
            page_params.push(Value::from(i64::from(page_size)));
            page_params.push(Value::from(page_offset(page, page_size)));

            let mut stmt = conn.prepare(&page_sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params_from_iter(page_params), map_activity_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok((rows, total as u64))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn record(&self, activity: NewActivity) -> Result<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let metadata = serde_json::to_string(&activity.metadata).map_err(|err| {
                SalesdeskError::Database(format!("failed to serialise activity metadata: {err}"))
            })?;

            conn.execute(
                INSERT_ACTIVITY_SQL,
                params![
                    Uuid::new_v4().to_string(),
                    Utc::now().timestamp(),
                    activity.action_type,
                    activity.description,
                    metadata,
                    activity.entity_type.as_str(),
                    activity.entity_id,
                    activity.actor_id,
                ],
            )
            .map_err(map_sql_error)?;

            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn for_entities(&self, refs: &[(EntityKind, String)]) -> Result<Vec<ActivityRecord>> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }

        let db = Arc::clone(&self.db);
        let refs = refs.to_vec();
        task::spawn_blocking(move || -> Result<Vec<ActivityRecord>> {
            let conn = db.get_connection()?;

            let clauses =
                vec!["(a.entity_type = ? AND a.entity_id = ?)"; refs.len()].join(" OR ");
            let sql =
                format!("{ACTIVITY_SELECT} WHERE {clauses} ORDER BY a.timestamp DESC");

            let mut values = Vec::with_capacity(refs.len() * 2);
            for (kind, id) in refs {
                values.push(Value::from(kind.as_str().to_string()));
                values.push(Value::from(id));
            }

            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params_from_iter(values), map_activity_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }
}

const ACTIVITY_SELECT: &str = "SELECT a.id, a.timestamp, a.action_type, a.description, \
    a.metadata, a.entity_type, a.entity_id, a.actor_id, p.full_name \
    FROM activity_log a LEFT JOIN profiles p ON p.id = a.actor_id";

const INSERT_ACTIVITY_SQL: &str = "INSERT INTO activity_log (
        id, timestamp, action_type, description, metadata, entity_type, entity_id, actor_id
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

fn build_filter(filters: &ActivityFilters) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(actor) = filters.actor_id.as_deref() {
        clauses.push(format!("a.actor_id = ?{}", params.len() + 1));
        params.push(Value::from(actor.to_string()));
    }
    if let Some(start) = filters.start {
        clauses.push(format!("a.timestamp >= ?{}", params.len() + 1));
        params.push(Value::from(start.timestamp()));
    }
    if let Some(end) = filters.end {
        clauses.push(format!("a.timestamp <= ?{}", params.len() + 1));
        params.push(Value::from(end.timestamp()));
    }
    if let Some(kind) = filters.entity_type {
        clauses.push(format!("a.entity_type = ?{}", params.len() + 1));
        params.push(Value::from(kind.as_str().to_string()));
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

fn map_activity_row(row: &Row<'_>) -> rusqlite::Result<ActivityRecord> {
    let metadata_raw: String = row.get(4)?;

    Ok(ActivityRecord {
        id: row.get(0)?,
        timestamp: datetime_column(1, row.get(1)?)?,
        action_type: row.get(2)?,
        description: row.get(3)?,
        // Metadata is display-only; malformed payloads degrade to null
        // rather than failing the page.
        metadata: serde_json::from_str(&metadata_raw).unwrap_or(serde_json::Value::Null),
        entity_type: row.get(5)?,
        entity_id: row.get(6)?,
        actor_id: row.get(7)?,
        actor_name: row.get(8)?,
    })
}

fn map_sql_error(err: rusqlite::Error) -> SalesdeskError {
    SalesdeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SalesdeskError {
    if err.is_cancelled() {
        SalesdeskError::Internal("blocking activity repository task cancelled".into())
    } else {
        SalesdeskError::Internal(format!("blocking activity repository task failed: {err}"))
    }
}
