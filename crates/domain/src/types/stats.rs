//! Dashboard aggregation types

use serde::{Deserialize, Serialize};

use super::deal::DealStage;

/// Lead count per acquisition source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}

/// Deal count and summed value per pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageMetric {
    pub stage: DealStage,
    pub count: u64,
    pub value: f64,
}

/// Pending-task urgency counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSummaryMetric {
    pub overdue: u64,
    pub due_today: u64,
}

/// Per-source revenue attribution. Deals attribute to a source through
/// their linked lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueStream {
    pub source: String,
    pub active_leads: u64,
    pub won_deals: u64,
    pub total_value: f64,
}

/// Full dashboard payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub active_leads: Vec<SourceCount>,
    pub deal_pipeline: Vec<StageMetric>,
    pub task_summary: TaskSummaryMetric,
    pub revenue_by_stream: Vec<RevenueStream>,
}
