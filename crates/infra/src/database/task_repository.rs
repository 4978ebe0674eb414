//! SQLite-backed task repository.
//!
//! Implements the `TaskStore` port used by the task service and the
//! `TaskLookup` port used by the activity feed resolver. Feed summaries
//! expand the task's lead and deal links, and through the deal its lead,
//! in a single query.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use salesdesk_core::feed::ports::TaskLookup;
use salesdesk_core::tasks::ports::{TaskScope, TaskStore};
use salesdesk_domain::{
    DealStage, DealSummary, EntityKind, NewTask, Result, SalesdeskError, Task, TaskFilters,
    TaskStatus, TaskSummary, TaskType,
};
use tokio::task;
use uuid::Uuid;

use super::deal_repository::map_joined_lead;
use super::manager::DbManager;
use super::rows::{date_column, datetime_column, enum_column, page_offset};
use crate::errors::InfraError;

/// Task store and feed lookup backed by SQLite.
pub struct SqliteTaskRepository {
    db: Arc<DbManager>,
}

impl SqliteTaskRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for SqliteTaskRepository {
    async fn list(
        &self,
        scope: &TaskScope,
        filters: &TaskFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Task>, u64)> {
        let db = Arc::clone(&self.db);
        let scope = scope.clone();
        let filters = filters.clone();
        task::spawn_blocking(move || -> Result<(Vec<Task>, u64)> {
            let conn = db.get_connection()?;
            let (where_sql, join_sql, filter_params) = build_filter(&scope, &filters);

            let count_sql = format!("SELECT COUNT(*) FROM tasks t{join_sql}{where_sql}");
            let total: i64 = conn
                .query_row(&count_sql, params_from_iter(filter_params.clone()), |row| row.get(0))
                .map_err(map_sql_error)?;

            // Pending tasks only, soonest due date first.
            let page_sql = format!(
                "SELECT t.id, t.task_type, t.description, t.due_date, t.status, \
                 t.cancel_reason, t.owner_id, t.lead_id, t.deal_id, t.created_at \
                 FROM tasks t{join_sql}{where_sql} ORDER BY t.due_date ASC LIMIT ? OFFSET ?"
            );
            let mut page_params = filter_params;
            page_params.push(Value::from(i64::from(page_size)));
            page_params.push(Value::from(page_offset(page, page_size)));

            let mut stmt = conn.prepare(&page_sql).map_err(map_sql_error)?;
            let tasks = stmt
                .query_map(params_from_iter(page_params), map_task_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok((tasks, total as u64))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: &str) -> Result<Task> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<Task> {
            let conn = db.get_connection()?;
            conn.query_row(TASK_BY_ID_SQL, params![id], map_task_row).map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    SalesdeskError::NotFound(format!("task {id}"))
                }
                other => map_sql_error(other),
            })
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert(&self, new_task: NewTask) -> Result<Task> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Task> {
            let conn = db.get_connection()?;
            let task = Task {
                id: Uuid::new_v4().to_string(),
                task_type: new_task.task_type,
                description: new_task.description,
                due_date: new_task.due_date,
                status: TaskStatus::Pending,
                cancel_reason: None,
                owner_id: new_task.owner_id,
                lead_id: new_task.lead_id,
                deal_id: new_task.deal_id,
                created_at: stored_now(),
            };

            conn.execute(
                INSERT_TASK_SQL,
                params![
                    task.id,
                    task.task_type.as_str(),
                    task.description,
                    task.due_date.to_string(),
                    task.status.as_str(),
                    task.owner_id,
                    task.lead_id,
                    task.deal_id,
                    task.created_at.timestamp(),
                ],
            )
            .map_err(map_sql_error)?;

            Ok(task)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_status(
        &self,
        id: &str,
        status: TaskStatus,
        cancel_reason: Option<&str>,
    ) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let cancel_reason = cancel_reason.map(str::to_string);
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE tasks SET status = ?1, cancel_reason = ?2 WHERE id = ?3",
                    params![status.as_str(), cancel_reason, id],
                )
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(SalesdeskError::NotFound(format!("task {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl TaskLookup for SqliteTaskRepository {
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<TaskSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let db = Arc::clone(&self.db);
        let ids = ids.to_vec();
        task::spawn_blocking(move || -> Result<Vec<TaskSummary>> {
            let conn = db.get_connection()?;
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!(
                "SELECT t.id, t.description, \
                 tl.id, tl.name, tl.company, tl.source, \
                 d.id, d.name, d.value, d.stage, \
                 dl.id, dl.name, dl.company, dl.source \
                 FROM tasks t \
                 LEFT JOIN leads tl ON tl.id = t.lead_id \
                 LEFT JOIN deals d ON d.id = t.deal_id \
                 LEFT JOIN leads dl ON dl.id = d.lead_id \
                 WHERE t.id IN ({placeholders})"
            );

            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let summaries = stmt
                .query_map(params_from_iter(ids.into_iter().map(Value::from)), map_task_summary_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok(summaries)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn ids_linked_to(&self, entity: EntityKind, entity_id: &str) -> Result<Vec<String>> {
        let column = match entity {
            EntityKind::Lead => "lead_id",
            EntityKind::Deal => "deal_id",
            // Tasks do not link to tasks.
            EntityKind::Task => return Ok(Vec::new()),
        };

        let db = Arc::clone(&self.db);
        let entity_id = entity_id.to_string();
        task::spawn_blocking(move || -> Result<Vec<String>> {
            let conn = db.get_connection()?;
            let sql = format!("SELECT id FROM tasks WHERE {column} = ?1");
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let ids = stmt
                .query_map(params![entity_id], |row| row.get::<_, String>(0))
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(ids)
        })
        .await
        .map_err(map_join_error)?
    }
}

const TASK_BY_ID_SQL: &str = "SELECT id, task_type, description, due_date, status, \
    cancel_reason, owner_id, lead_id, deal_id, created_at FROM tasks WHERE id = ?1";

const INSERT_TASK_SQL: &str = "INSERT INTO tasks (
        id, task_type, description, due_date, status, owner_id, lead_id, deal_id, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

fn build_filter(scope: &TaskScope, filters: &TaskFilters) -> (String, String, Vec<Value>) {
    let mut clauses = vec!["t.status = 'pending'".to_string()];
    let mut params = Vec::new();
    let mut join_sql = String::new();

    match scope {
        TaskScope::Owner(owner_id) => {
            clauses.push(format!("t.owner_id = ?{}", params.len() + 1));
            params.push(Value::from(owner_id.clone()));
        }
        TaskScope::Department(department) => {
            join_sql = " JOIN profiles p ON p.id = t.owner_id".to_string();
            clauses.push(format!("p.department = ?{}", params.len() + 1));
            params.push(Value::from(department.clone()));
        }
    }

    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|term| !term.is_empty()) {
        clauses.push(format!("t.description LIKE ?{}", params.len() + 1));
        params.push(Value::from(format!("%{term}%")));
    }
    if let Some(task_type) = filters.task_type {
        clauses.push(format!("t.task_type = ?{}", params.len() + 1));
        params.push(Value::from(task_type.as_str().to_string()));
    }
    if let Some(owner) = filters.owner_id.as_deref() {
        clauses.push(format!("t.owner_id = ?{}", params.len() + 1));
        params.push(Value::from(owner.to_string()));
    }

    (format!(" WHERE {}", clauses.join(" AND ")), join_sql, params)
}

fn map_task_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let type_raw: String = row.get(1)?;
    let due_raw: String = row.get(3)?;
    let status_raw: String = row.get(4)?;

    Ok(Task {
        id: row.get(0)?,
        task_type: enum_column(1, TaskType::parse, &type_raw)?,
        description: row.get(2)?,
        due_date: date_column(3, &due_raw)?,
        status: enum_column(4, TaskStatus::parse, &status_raw)?,
        cancel_reason: row.get(5)?,
        owner_id: row.get(6)?,
        lead_id: row.get(7)?,
        deal_id: row.get(8)?,
        created_at: datetime_column(9, row.get(9)?)?,
    })
}

fn map_task_summary_row(row: &Row<'_>) -> rusqlite::Result<TaskSummary> {
    let deal = match row.get::<_, Option<String>>(6)? {
        Some(_) => {
            let stage_raw: String = row.get(9)?;
            Some(DealSummary {
                id: row.get(6)?,
                name: row.get(7)?,
                value: row.get(8)?,
                stage: enum_column(9, DealStage::parse, &stage_raw)?,
                lead: map_joined_lead(row, 10)?,
            })
        }
        None => None,
    };

    Ok(TaskSummary {
        id: row.get(0)?,
        description: row.get(1)?,
        lead: map_joined_lead(row, 2)?,
        deal,
    })
}

fn stored_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default()
}

fn map_sql_error(err: rusqlite::Error) -> SalesdeskError {
    SalesdeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SalesdeskError {
    if err.is_cancelled() {
        SalesdeskError::Internal("blocking task repository task cancelled".into())
    } else {
        SalesdeskError::Internal(format!("blocking task repository task failed: {err}"))
    }
}
