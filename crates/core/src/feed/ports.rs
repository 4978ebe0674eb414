//! Port interfaces for the activity feed
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use salesdesk_domain::{
    ActivityFilters, ActivityRecord, DealSummary, EntityKind, LeadSummary, NewActivity, Result,
    Role, TaskSummary, TeamMember,
};

/// Append-only activity log with filtered, paginated reads.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Fetch one page of the log, newest first, plus the total match count.
    ///
    /// Pushed-down filters: actor, date range, entity type. The resolved
    /// source label is not known at this layer and cannot be filtered here.
    async fn list(
        &self,
        filters: &ActivityFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<ActivityRecord>, u64)>;

    /// Append a row to the log.
    async fn record(&self, activity: NewActivity) -> Result<()>;

    /// All rows concerning any of the given (type, id) pairs, newest first.
    async fn for_entities(&self, refs: &[(EntityKind, String)]) -> Result<Vec<ActivityRecord>>;
}

/// Bulk lead lookup keyed by unique id.
#[async_trait]
pub trait LeadLookup: Send + Sync {
    /// Fetch summaries for the given ids. Ids with no matching record are
    /// simply absent from the result; that is not an error.
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<LeadSummary>>;
}

/// Bulk deal lookup with one level of lead expansion.
#[async_trait]
pub trait DealLookup: Send + Sync {
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<DealSummary>>;
}

/// Bulk task lookup with lead and deal expansion (the deal carries its own
/// lead when linked).
#[async_trait]
pub trait TaskLookup: Send + Sync {
    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<TaskSummary>>;

    /// Ids of tasks linked to the given lead or deal.
    async fn ids_linked_to(&self, entity: EntityKind, entity_id: &str) -> Result<Vec<String>>;
}

/// Profile directory used to populate the feed's actor filter control.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn list_members(&self, role: Option<Role>) -> Result<Vec<TeamMember>>;
}
