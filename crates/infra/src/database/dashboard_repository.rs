//! SQLite-backed dashboard aggregates.
//!
//! Implements the `DashboardQueries` port. Leads with no source group under
//! the fallback label, matching the feed's resolution invariant.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Row};
use salesdesk_core::dashboard::ports::DashboardQueries;
use salesdesk_domain::{
    DealStage, Result, RevenueStream, SalesdeskError, SourceCount, StageMetric, TaskSummaryMetric,
};
use tokio::task;

use super::manager::DbManager;
use super::rows::enum_column;
use crate::errors::InfraError;

/// Dashboard aggregates backed by SQLite.
pub struct SqliteDashboardRepository {
    db: Arc<DbManager>,
}

impl SqliteDashboardRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DashboardQueries for SqliteDashboardRepository {
    async fn active_leads_by_source(&self) -> Result<Vec<SourceCount>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Vec<SourceCount>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(ACTIVE_LEADS_SQL).map_err(map_sql_error)?;
            let counts = stmt
                .query_map([], |row| {
                    Ok(SourceCount { source: row.get(0)?, count: row.get::<_, i64>(1)? as u64 })
                })
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(counts)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn pipeline_by_stage(&self) -> Result<Vec<StageMetric>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Vec<StageMetric>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(PIPELINE_SQL).map_err(map_sql_error)?;
            let metrics = stmt
                .query_map([], map_stage_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(metrics)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn task_summary(&self, today: NaiveDate) -> Result<TaskSummaryMetric> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<TaskSummaryMetric> {
            let conn = db.get_connection()?;
            let today = today.to_string();
            conn.query_row(TASK_SUMMARY_SQL, params![today], |row| {
                Ok(TaskSummaryMetric {
                    overdue: row.get::<_, i64>(0)? as u64,
                    due_today: row.get::<_, i64>(1)? as u64,
                })
            })
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn revenue_by_stream(&self) -> Result<Vec<RevenueStream>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Vec<RevenueStream>> {
            let conn = db.get_connection()?;
            let mut streams: BTreeMap<String, RevenueStream> = BTreeMap::new();

            let mut stmt = conn.prepare(ACTIVE_LEADS_SQL).map_err(map_sql_error)?;
            let lead_rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            for (source, count) in lead_rows {
                streams
                    .entry(source.clone())
                    .or_insert_with(|| empty_stream(&source))
                    .active_leads = count as u64;
            }

            let mut stmt = conn.prepare(WON_DEALS_SQL).map_err(map_sql_error)?;
            let deal_rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, f64>(2)?,
                    ))
                })
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            for (source, count, value) in deal_rows {
                let stream =
                    streams.entry(source.clone()).or_insert_with(|| empty_stream(&source));
                stream.won_deals = count as u64;
                stream.total_value = value;
            }

            Ok(streams.into_values().collect())
        })
        .await
        .map_err(map_join_error)?
    }
}

const ACTIVE_LEADS_SQL: &str = "SELECT COALESCE(source, 'Other') AS src, COUNT(*)
    FROM leads WHERE status NOT IN ('Won', 'Lost')
    GROUP BY src ORDER BY COUNT(*) DESC, src ASC";

const PIPELINE_SQL: &str = "SELECT stage, COUNT(*), COALESCE(SUM(value), 0)
    FROM deals GROUP BY stage ORDER BY stage";

const TASK_SUMMARY_SQL: &str = "SELECT
        COUNT(CASE WHEN due_date < ?1 THEN 1 END),
        COUNT(CASE WHEN due_date = ?1 THEN 1 END)
    FROM tasks WHERE status = 'pending'";

// Deals attribute to a source through their linked lead; won deals with no
// lead (or a lead without a source) land under the fallback label.
const WON_DEALS_SQL: &str = "SELECT COALESCE(l.source, 'Other') AS src, COUNT(*),
        COALESCE(SUM(d.value), 0)
    FROM deals d LEFT JOIN leads l ON l.id = d.lead_id
    WHERE d.stage = 'Won'
    GROUP BY src";

fn empty_stream(source: &str) -> RevenueStream {
    RevenueStream {
        source: source.to_string(),
        active_leads: 0,
        won_deals: 0,
        total_value: 0.0,
    }
}

fn map_stage_row(row: &Row<'_>) -> rusqlite::Result<StageMetric> {
    let stage_raw: String = row.get(0)?;
    Ok(StageMetric {
        stage: enum_column(0, DealStage::parse, &stage_raw)?,
        count: row.get::<_, i64>(1)? as u64,
        value: row.get(2)?,
    })
}

fn map_sql_error(err: rusqlite::Error) -> SalesdeskError {
    SalesdeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SalesdeskError {
    if err.is_cancelled() {
        SalesdeskError::Internal("blocking dashboard repository task cancelled".into())
    } else {
        SalesdeskError::Internal(format!("blocking dashboard repository task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn active_leads_exclude_terminal_statuses() {
        let (repo, db, _temp_dir) = setup_repository();

        seed(&db,
            "INSERT INTO leads (id, name, company, source, status, owner_id, created_at) VALUES
                ('l1', 'A', NULL, 'Upwork', 'Applied', 'u1', 1700000000),
                ('l2', 'B', NULL, 'Upwork', 'Won', 'u1', 1700000000),
                ('l3', 'C', NULL, NULL, 'Interview', 'u1', 1700000000);");

        let counts = repo.active_leads_by_source().await.expect("aggregate succeeds");

        assert_eq!(counts.len(), 2);
        assert!(counts
            .iter()
            .any(|entry| entry.source == "Upwork" && entry.count == 1));
        assert!(counts.iter().any(|entry| entry.source == "Other" && entry.count == 1));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn pipeline_sums_value_per_stage() {
        let (repo, db, _temp_dir) = setup_repository();

        seed(&db,
            "INSERT INTO deals (id, name, value, close_date, stage, owner_id, lead_id, notes, created_at) VALUES
                ('d1', 'A', 100.0, NULL, 'Proposal', 'u1', NULL, NULL, 1700000000),
                ('d2', 'B', 250.0, NULL, 'Proposal', 'u1', NULL, NULL, 1700000000),
                ('d3', 'C', NULL, NULL, 'Won', 'u1', NULL, NULL, 1700000000);");

        let metrics = repo.pipeline_by_stage().await.expect("aggregate succeeds");

        let proposal = metrics
            .iter()
            .find(|entry| entry.stage == DealStage::Proposal)
            .expect("proposal stage present");
        assert_eq!(proposal.count, 2);
        assert!((proposal.value - 350.0).abs() < f64::EPSILON);

        let won = metrics
            .iter()
            .find(|entry| entry.stage == DealStage::Won)
            .expect("won stage present");
        assert_eq!(won.count, 1);
        assert!((won.value - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn task_summary_counts_overdue_and_due_today() {
        let (repo, db, _temp_dir) = setup_repository();

        seed(&db,
            "INSERT INTO tasks (id, task_type, description, due_date, status, cancel_reason, owner_id, lead_id, deal_id, created_at) VALUES
                ('t1', 'Call', 'overdue', '2024-05-01', 'pending', NULL, 'u1', NULL, NULL, 1700000000),
                ('t2', 'Call', 'today', '2024-06-01', 'pending', NULL, 'u1', NULL, NULL, 1700000000),
                ('t3', 'Call', 'future', '2024-07-01', 'pending', NULL, 'u1', NULL, NULL, 1700000000),
                ('t4', 'Call', 'done', '2024-05-01', 'completed', NULL, 'u1', NULL, NULL, 1700000000);");

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date valid");
        let summary = repo.task_summary(today).await.expect("aggregate succeeds");

        assert_eq!(summary.overdue, 1);
        assert_eq!(summary.due_today, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn revenue_streams_attribute_won_deals_through_leads() {
        let (repo, db, _temp_dir) = setup_repository();

        seed(&db,
            "INSERT INTO leads (id, name, company, source, status, owner_id, created_at) VALUES
                ('l1', 'A', NULL, 'B2B', 'Applied', 'u1', 1700000000),
                ('l2', 'B', NULL, 'B2B', 'Won', 'u1', 1700000000);
             INSERT INTO deals (id, name, value, close_date, stage, owner_id, lead_id, notes, created_at) VALUES
                ('d1', 'Won deal', 5000.0, NULL, 'Won', 'u1', 'l2', NULL, 1700000000),
                ('d2', 'Orphan won', 700.0, NULL, 'Won', 'u1', NULL, NULL, 1700000000),
                ('d3', 'Open deal', 900.0, NULL, 'Proposal', 'u1', 'l1', NULL, 1700000000);");

        let streams = repo.revenue_by_stream().await.expect("aggregate succeeds");

        let b2b = streams.iter().find(|entry| entry.source == "B2B").expect("B2B present");
        assert_eq!(b2b.active_leads, 1);
        assert_eq!(b2b.won_deals, 1);
        assert!((b2b.total_value - 5000.0).abs() < f64::EPSILON);

        let other =
            streams.iter().find(|entry| entry.source == "Other").expect("Other present");
        assert_eq!(other.won_deals, 1);
        assert!((other.total_value - 700.0).abs() < f64::EPSILON);
    }

    fn seed(db: &Arc<DbManager>, sql: &str) {
        let conn = db.get_connection().expect("connection");
        conn.execute_batch(sql).expect("seed rows inserted");
    }

    fn setup_repository() -> (SqliteDashboardRepository, Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("tempdir created");
        let db_path = temp_dir.path().join("dashboard.db");

        let manager = Arc::new(DbManager::new(&db_path, 4).expect("db manager created"));
        manager.run_migrations().expect("migrations run");

        let repo = SqliteDashboardRepository::new(manager.clone());
        (repo, manager, temp_dir)
    }
}
