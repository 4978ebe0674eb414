//! SQLite-backed deal repository.
//!
//! Implements the `DealStore` port used by the deal service and the
//! `DealLookup` port used by the activity feed resolver. Every read
//! expands the linked lead summary in place with a LEFT JOIN.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use salesdesk_core::deals::ports::DealStore;
use salesdesk_core::feed::ports::DealLookup;
use salesdesk_domain::{
    Deal, DealFilters, DealStage, DealSummary, LeadSummary, NewDeal, Result, SalesdeskError,
};
use tokio::task;
use uuid::Uuid;

use super::lead_repository::map_lead_summary_row;
use super::manager::DbManager;
use super::rows::{date_column, datetime_column, enum_column, page_offset};
use crate::errors::InfraError;

/// Deal store and feed lookup backed by SQLite.
pub struct SqliteDealRepository {
    db: Arc<DbManager>,
}

impl SqliteDealRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DealStore for SqliteDealRepository {
    async fn list(
        &self,
        filters: &DealFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Deal>, u64)> {
        let db = Arc::clone(&self.db);
        let filters = filters.clone();
        task::spawn_blocking(move || -> Result<(Vec<Deal>, u64)> {
            let conn = db.get_connection()?;
            let (where_sql, filter_params) = build_filter(&filters);

            let count_sql = format!(
                "SELECT COUNT(*) FROM deals d LEFT JOIN leads l ON l.id = d.lead_id{where_sql}"
            );
            let total: i64 = conn
                .query_row(&count_sql, params_from_iter(filter_params.clone()), |row| row.get(0))
                .map_err(map_sql_error)?;

            let page_sql = format!(
                "{DEAL_SELECT}{where_sql} ORDER BY d.created_at DESC LIMIT ? OFFSET ?"
            );
            let mut page_params = filter_params;
            page_params.push(Value::from(i64::from(page_size)));
            page_params.push(Value::from(page_offset(page, page_size)));

            let mut stmt = conn.prepare(&page_sql).map_err(map_sql_error)?;
            let deals = stmt
                .query_map(params_from_iter(page_params), map_deal_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok((deals, total as u64))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: &str) -> Result<Deal> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<Deal> {
            let conn = db.get_connection()?;
            let sql = format!("{DEAL_SELECT} WHERE d.id = ?1");
            conn.query_row(&sql, params![id], map_deal_row).map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    SalesdeskError::NotFound(format!("deal {id}"))
                }
                other => map_sql_error(other),
            })
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert(&self, new_deal: NewDeal) -> Result<Deal> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Deal> {
            let conn = db.get_connection()?;
            let id = Uuid::new_v4().to_string();
            let created_at = stored_now();

            conn.execute(
                INSERT_DEAL_SQL,
                params![
                    id,
                    new_deal.name,
                    new_deal.value,
                    new_deal.close_date.map(|date| date.to_string()),
                    new_deal.stage.as_str(),
                    new_deal.owner_id,
                    new_deal.lead_id,
                    new_deal.notes,
                    created_at.timestamp(),
                ],
            )
            .map_err(map_sql_error)?;

            let lead = match new_deal.lead_id.as_deref() {
                Some(lead_id) => find_lead_summary(&conn, lead_id)?,
                None => None,
            };

            Ok(Deal {
                id,
                name: new_deal.name,
                value: new_deal.value,
                close_date: new_deal.close_date,
                stage: new_deal.stage,
                owner_id: new_deal.owner_id,
                lead,
                notes: new_deal.notes,
                created_at,
            })
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_stage(&self, id: &str, stage: DealStage) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute("UPDATE deals SET stage = ?1 WHERE id = ?2", params![stage.as_str(), id])
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(SalesdeskError::NotFound(format!("deal {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl DealLookup for SqliteDealRepository {
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<DealSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let db = Arc::clone(&self.db);
        let ids = ids.to_vec();
        task::spawn_blocking(move || -> Result<Vec<DealSummary>> {
            let conn = db.get_connection()?;
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!(
                "SELECT d.id, d.name, d.value, d.stage, l.id, l.name, l.company, l.source \
                 FROM deals d LEFT JOIN leads l ON l.id = d.lead_id \
                 WHERE d.id IN ({placeholders})"
            );

            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let summaries = stmt
                .query_map(params_from_iter(ids.into_iter().map(Value::from)), map_deal_summary_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok(summaries)
        })
        .await
        .map_err(map_join_error)?
    }
}

const DEAL_SELECT: &str = "SELECT d.id, d.name, d.value, d.close_date, d.stage, d.owner_id, \
    d.notes, d.created_at, l.id, l.name, l.company, l.source \
    FROM deals d LEFT JOIN leads l ON l.id = d.lead_id";

const INSERT_DEAL_SQL: &str = "INSERT INTO deals (
        id, name, value, close_date, stage, owner_id, lead_id, notes, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

fn build_filter(filters: &DealFilters) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|term| !term.is_empty()) {
        clauses.push("(d.name LIKE ?1 OR l.name LIKE ?1 OR l.company LIKE ?1)".to_string());
        params.push(Value::from(format!("%{term}%")));
    }
    if let Some(stage) = filters.stage {
        clauses.push(format!("d.stage = ?{}", params.len() + 1));
        params.push(Value::from(stage.as_str().to_string()));
    }
    if let Some(owner) = filters.owner_id.as_deref() {
        clauses.push(format!("d.owner_id = ?{}", params.len() + 1));
        params.push(Value::from(owner.to_string()));
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

fn map_deal_row(row: &Row<'_>) -> rusqlite::Result<Deal> {
    let stage_raw: String = row.get(4)?;
    let close_date = match row.get::<_, Option<String>>(3)? {
        Some(raw) => Some(date_column(3, &raw)?),
        None => None,
    };

    Ok(Deal {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        close_date,
        stage: enum_column(4, DealStage::parse, &stage_raw)?,
        owner_id: row.get(5)?,
        notes: row.get(6)?,
        created_at: datetime_column(7, row.get(7)?)?,
        lead: map_joined_lead(row, 8)?,
    })
}

fn map_deal_summary_row(row: &Row<'_>) -> rusqlite::Result<DealSummary> {
    let stage_raw: String = row.get(3)?;
    Ok(DealSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        stage: enum_column(3, DealStage::parse, &stage_raw)?,
        lead: map_joined_lead(row, 4)?,
    })
}

/// A LEFT JOINed lead is present when its id column is non-null.
pub(crate) fn map_joined_lead(
    row: &Row<'_>,
    offset: usize,
) -> rusqlite::Result<Option<LeadSummary>> {
    match row.get::<_, Option<String>>(offset)? {
        Some(_) => Ok(Some(map_lead_summary_row(row, offset)?)),
        None => Ok(None),
    }
}

fn find_lead_summary(
    conn: &super::manager::DbConnection,
    lead_id: &str,
) -> Result<Option<LeadSummary>> {
    let mut stmt = conn
        .prepare("SELECT id, name, company, source FROM leads WHERE id = ?1")
        .map_err(map_sql_error)?;
    let mut rows = stmt
        .query_map(params![lead_id], |row| map_lead_summary_row(row, 0))
        .map_err(map_sql_error)?;

    match rows.next() {
        Some(row) => row.map(Some).map_err(map_sql_error),
        None => Ok(None),
    }
}

fn stored_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default()
}

fn map_sql_error(err: rusqlite::Error) -> SalesdeskError {
    SalesdeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SalesdeskError {
    if err.is_cancelled() {
        SalesdeskError::Internal("blocking deal repository task cancelled".into())
    } else {
        SalesdeskError::Internal(format!("blocking deal repository task failed: {err}"))
    }
}
