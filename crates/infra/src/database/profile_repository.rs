//! SQLite-backed profile directory.
//!
//! Implements the `TeamDirectory` port used to populate the feed's actor
//! filter control and the assignment flows.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Row};
use salesdesk_core::feed::ports::TeamDirectory;
use salesdesk_domain::{Result, Role, SalesdeskError, TeamMember};
use tokio::task;

use super::manager::DbManager;
use super::rows::enum_column;
use crate::errors::InfraError;

/// Profile directory backed by SQLite.
pub struct SqliteProfileRepository {
    db: Arc<DbManager>,
}

impl SqliteProfileRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TeamDirectory for SqliteProfileRepository {
    async fn list_members(&self, role: Option<Role>) -> Result<Vec<TeamMember>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Vec<TeamMember>> {
            let conn = db.get_connection()?;

            let members = match role {
                Some(role) => {
                    let mut stmt = conn.prepare(MEMBERS_BY_ROLE_SQL).map_err(map_sql_error)?;
                    let rows = stmt
                        .query_map(params![role.as_str()], map_member_row)
                        .map_err(map_sql_error)?
                        .collect::<rusqlite::Result<Vec<_>>>()
                        .map_err(map_sql_error)?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(ALL_MEMBERS_SQL).map_err(map_sql_error)?;
                    let rows = stmt
                        .query_map([], map_member_row)
                        .map_err(map_sql_error)?
                        .collect::<rusqlite::Result<Vec<_>>>()
                        .map_err(map_sql_error)?;
                    rows
                }
            };

            Ok(members)
        })
        .await
        .map_err(map_join_error)?
    }
}

const ALL_MEMBERS_SQL: &str =
    "SELECT id, full_name, role, department FROM profiles ORDER BY full_name";

const MEMBERS_BY_ROLE_SQL: &str =
    "SELECT id, full_name, role, department FROM profiles WHERE role = ?1 ORDER BY full_name";

fn map_member_row(row: &Row<'_>) -> rusqlite::Result<TeamMember> {
    let role_raw: String = row.get(2)?;
    Ok(TeamMember {
        id: row.get(0)?,
        full_name: row.get(1)?,
        role: enum_column(2, Role::parse, &role_raw)?,
        department: row.get(3)?,
    })
}

fn map_sql_error(err: rusqlite::Error) -> SalesdeskError {
    SalesdeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SalesdeskError {
    if err.is_cancelled() {
        SalesdeskError::Internal("blocking profile repository task cancelled".into())
    } else {
        SalesdeskError::Internal(format!("blocking profile repository task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn list_members_filters_by_role() {
        let (repo, db, _temp_dir) = setup_repository();

        {
            let conn = db.get_connection().expect("connection");
            conn.execute_batch(
                "INSERT INTO profiles (id, full_name, role, department) VALUES
                    ('u1', 'Ann', 'sales_rep', 'emea'),
                    ('u2', 'Ben', 'manager', 'emea'),
                    ('u3', 'Cleo', 'sales_rep', 'apac');",
            )
            .expect("profiles seeded");
        }

        let reps =
            repo.list_members(Some(Role::SalesRep)).await.expect("filtered list succeeds");
        assert_eq!(reps.len(), 2);
        assert!(reps.iter().all(|member| member.role == Role::SalesRep));

        let everyone = repo.list_members(None).await.expect("full list succeeds");
        assert_eq!(everyone.len(), 3);
        assert_eq!(everyone[0].full_name, "Ann");
    }

    fn setup_repository() -> (SqliteProfileRepository, Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("tempdir created");
        let db_path = temp_dir.path().join("profiles.db");

        let manager = Arc::new(DbManager::new(&db_path, 4).expect("db manager created"));
        manager.run_migrations().expect("migrations run");

        let repo = SqliteProfileRepository::new(manager.clone());
        (repo, manager, temp_dir)
    }
}
