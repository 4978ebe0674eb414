//! Port interfaces for dashboard aggregation

use async_trait::async_trait;
use chrono::NaiveDate;
use salesdesk_domain::{Result, RevenueStream, SourceCount, StageMetric, TaskSummaryMetric};

/// Aggregate queries backing the dashboard.
#[async_trait]
pub trait DashboardQueries: Send + Sync {
    /// Active (not Won/Lost) lead counts grouped by source.
    async fn active_leads_by_source(&self) -> Result<Vec<SourceCount>>;

    /// Deal count and summed value grouped by stage.
    async fn pipeline_by_stage(&self) -> Result<Vec<StageMetric>>;

    /// Overdue and due-today counters over pending tasks, relative to the
    /// given date.
    async fn task_summary(&self, today: NaiveDate) -> Result<TaskSummaryMetric>;

    /// Per-source active lead count, won-deal count, and won-deal value.
    async fn revenue_by_stream(&self) -> Result<Vec<RevenueStream>>;
}
