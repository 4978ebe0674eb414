//! Domain types and models

pub mod activity;
pub mod deal;
pub mod lead;
pub mod stats;
pub mod task;
pub mod team;

pub use activity::{
    ActivityFilters, ActivityRecord, EnrichedActivity, EntityKind, FeedPage, LinkedEntity,
    NewActivity,
};
pub use deal::{Deal, DealFilters, DealStage, DealSummary, NewDeal};
pub use lead::{Lead, LeadFilters, LeadSource, LeadStatus, LeadSummary, NewLead};
pub use stats::{DashboardMetrics, RevenueStream, SourceCount, StageMetric, TaskSummaryMetric};
pub use task::{Caller, NewTask, Task, TaskFilters, TaskStatus, TaskSummary, TaskType, TaskView};
pub use team::{Role, TeamMember};
