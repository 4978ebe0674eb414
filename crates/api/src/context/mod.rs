//! Application context - dependency injection container

use std::sync::Arc;

use salesdesk_core::{
    ActivityFeedService, DashboardService, DealService, LeadService, TaskService,
};
use salesdesk_domain::{Config, Result};
use salesdesk_infra::{
    DbManager, SqliteActivityRepository, SqliteDashboardRepository, SqliteDealRepository,
    SqliteLeadRepository, SqliteProfileRepository, SqliteTaskRepository,
};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub feed: ActivityFeedService,
    pub leads: LeadService,
    pub deals: DealService,
    pub tasks: TaskService,
    pub dashboard: DashboardService,
}

impl AppContext {
    /// Wire repositories and services from configuration. Runs migrations
    /// before any service touches the pool.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let activity_repo = Arc::new(SqliteActivityRepository::new(db.clone()));
        let lead_repo = Arc::new(SqliteLeadRepository::new(db.clone()));
        let deal_repo = Arc::new(SqliteDealRepository::new(db.clone()));
        let task_repo = Arc::new(SqliteTaskRepository::new(db.clone()));
        let profile_repo = Arc::new(SqliteProfileRepository::new(db.clone()));

        let feed = ActivityFeedService::new(
            activity_repo.clone(),
            lead_repo.clone(),
            deal_repo.clone(),
            task_repo.clone(),
            profile_repo,
        );
        let leads = LeadService::new(lead_repo, activity_repo.clone());
        let deals = DealService::new(deal_repo, activity_repo.clone());
        let tasks = TaskService::new(task_repo, activity_repo);
        let dashboard =
            DashboardService::new(Arc::new(SqliteDashboardRepository::new(db.clone())));

        Ok(Self { config, db, feed, leads, deals, tasks, dashboard })
    }
}
