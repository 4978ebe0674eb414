//! SQLite-backed lead repository.
//!
//! Implements the `LeadStore` port used by the lead service and the
//! `LeadLookup` port used by the activity feed resolver. All queries
//! operate on the shared connection pool provided by `DbManager`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use salesdesk_core::feed::ports::LeadLookup;
use salesdesk_core::leads::ports::LeadStore;
use salesdesk_domain::{
    Lead, LeadFilters, LeadSource, LeadStatus, LeadSummary, NewLead, Result, SalesdeskError,
};
use tokio::task;
use uuid::Uuid;

use super::manager::DbManager;
use super::rows::{datetime_column, enum_column, page_offset};
use crate::errors::InfraError;

/// Lead store and feed lookup backed by SQLite.
pub struct SqliteLeadRepository {
    db: Arc<DbManager>,
}

impl SqliteLeadRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LeadStore for SqliteLeadRepository {
    async fn list(
        &self,
        filters: &LeadFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Lead>, u64)> {
        let db = Arc::clone(&self.db);
        let filters = filters.clone();
        task::spawn_blocking(move || -> Result<(Vec<Lead>, u64)> {
            let conn = db.get_connection()?;
            let (where_sql, filter_params) = build_filter(&filters);

            let count_sql = format!("SELECT COUNT(*) FROM leads{where_sql}");
            let total: i64 = conn
                .query_row(&count_sql, params_from_iter(filter_params.clone()), |row| row.get(0))
                .map_err(map_sql_error)?;

            let page_sql = format!(
                "SELECT id, name, company, source, status, owner_id, created_at \
                 FROM leads{where_sql} ORDER BY created_at DESC LIMIT ? OFFSET ?"
            );
            let mut page_params = filter_params;
            page_params.push(Value::from(i64::from(page_size)));
            page_params.push(Value::from(page_offset(page, page_size)));

            let mut stmt = conn.prepare(&page_sql).map_err(map_sql_error)?;
            let leads = stmt
                .query_map(params_from_iter(page_params), map_lead_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok((leads, total as u64))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: &str) -> Result<Lead> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<Lead> {
            let conn = db.get_connection()?;
            conn.query_row(LEAD_BY_ID_SQL, params![id], map_lead_row).map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    SalesdeskError::NotFound(format!("lead {id}"))
                }
                other => map_sql_error(other),
            })
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert(&self, new_lead: NewLead) -> Result<Lead> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Lead> {
            let conn = db.get_connection()?;
            let lead = Lead {
                id: Uuid::new_v4().to_string(),
                name: new_lead.name,
                company: new_lead.company,
                source: new_lead.source,
                status: new_lead.status,
                owner_id: new_lead.owner_id,
                created_at: stored_now(),
            };

            conn.execute(
                INSERT_LEAD_SQL,
                params![
                    lead.id,
                    lead.name,
                    lead.company,
                    lead.source.map(LeadSource::as_str),
                    lead.status.as_str(),
                    lead.owner_id,
                    lead.created_at.timestamp(),
                ],
            )
            .map_err(map_sql_error)?;

            Ok(lead)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_status(&self, id: &str, status: LeadStatus) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute("UPDATE leads SET status = ?1 WHERE id = ?2", params![status.as_str(), id])
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(SalesdeskError::NotFound(format!("lead {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_owner(&self, id: &str, owner_id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let owner_id = owner_id.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute("UPDATE leads SET owner_id = ?1 WHERE id = ?2", params![owner_id, id])
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(SalesdeskError::NotFound(format!("lead {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl LeadLookup for SqliteLeadRepository {
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<LeadSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let db = Arc::clone(&self.db);
        let ids = ids.to_vec();
        task::spawn_blocking(move || -> Result<Vec<LeadSummary>> {
            let conn = db.get_connection()?;
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!(
                "SELECT id, name, company, source FROM leads WHERE id IN ({placeholders})"
            );

            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let summaries = stmt
                .query_map(params_from_iter(ids.into_iter().map(Value::from)), |row| {
                    map_lead_summary_row(row, 0)
                })
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok(summaries)
        })
        .await
        .map_err(map_join_error)?
    }
}

const LEAD_BY_ID_SQL: &str = "SELECT id, name, company, source, status, owner_id, created_at
    FROM leads WHERE id = ?1";

const INSERT_LEAD_SQL: &str = "INSERT INTO leads (
        id, name, company, source, status, owner_id, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

fn build_filter(filters: &LeadFilters) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|term| !term.is_empty()) {
        clauses.push("(name LIKE ?1 OR company LIKE ?1)".to_string());
        params.push(Value::from(format!("%{term}%")));
    }
    if let Some(status) = filters.status {
        clauses.push(format!("status = ?{}", params.len() + 1));
        params.push(Value::from(status.as_str().to_string()));
    }
    if let Some(source) = filters.source {
        clauses.push(format!("source = ?{}", params.len() + 1));
        params.push(Value::from(source.as_str().to_string()));
    }
    if let Some(owner) = filters.owner_id.as_deref() {
        clauses.push(format!("owner_id = ?{}", params.len() + 1));
        params.push(Value::from(owner.to_string()));
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

fn map_lead_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    let status_raw: String = row.get(4)?;
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        company: row.get(2)?,
        // Unknown legacy spellings degrade to an unset source.
        source: row.get::<_, Option<String>>(3)?.and_then(|raw| LeadSource::parse(&raw)),
        status: enum_column(4, LeadStatus::parse, &status_raw)?,
        owner_id: row.get(5)?,
        created_at: datetime_column(6, row.get(6)?)?,
    })
}

/// Map a lead summary starting at the given column offset; reused by the
/// deal and task repositories for their joined lead expansions.
pub(crate) fn map_lead_summary_row(
    row: &Row<'_>,
    offset: usize,
) -> rusqlite::Result<LeadSummary> {
    Ok(LeadSummary {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        company: row.get(offset + 2)?,
        source: row
            .get::<_, Option<String>>(offset + 3)?
            .and_then(|raw| LeadSource::parse(&raw)),
    })
}

fn stored_now() -> DateTime<Utc> {
    // Truncate to whole seconds so the returned record matches storage.
    DateTime::<Utc>::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default()
}

fn map_sql_error(err: rusqlite::Error) -> SalesdeskError {
    SalesdeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SalesdeskError {
    if err.is_cancelled() {
        SalesdeskError::Internal("blocking lead repository task cancelled".into())
    } else {
        SalesdeskError::Internal(format!("blocking lead repository task failed: {err}"))
    }
}
