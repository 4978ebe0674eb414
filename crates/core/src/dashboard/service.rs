//! Dashboard service - core business logic

use std::sync::Arc;

use chrono::NaiveDate;
use salesdesk_domain::{DashboardMetrics, Result};

use super::ports::DashboardQueries;

/// Dashboard service
pub struct DashboardService {
    queries: Arc<dyn DashboardQueries>,
}

impl DashboardService {
    /// Create a new dashboard service
    pub fn new(queries: Arc<dyn DashboardQueries>) -> Self {
        Self { queries }
    }

    /// Compute the full dashboard payload. The four aggregates are
    /// independent reads and run concurrently; any failure fails the call.
    pub async fn metrics(&self, today: NaiveDate) -> Result<DashboardMetrics> {
        let (active_leads, deal_pipeline, task_summary, revenue_by_stream) = tokio::try_join!(
            self.queries.active_leads_by_source(),
            self.queries.pipeline_by_stage(),
            self.queries.task_summary(today),
            self.queries.revenue_by_stream(),
        )?;

        Ok(DashboardMetrics { active_leads, deal_pipeline, task_summary, revenue_by_stream })
    }
}
