//! Activity log types
//!
//! The activity log is append-only: every user or system action is recorded
//! with the entity type and id it concerns. Feed rows are enriched
//! per-request into [`EnrichedActivity`]; the enriched form is never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deal::DealSummary;
use super::lead::LeadSummary;
use super::task::TaskSummary;

/// Known `action_type` values written by the services. The column itself is
/// free-form; readers must tolerate anything.
pub mod action {
    pub const LEAD_CREATED: &str = "lead_created";
    pub const LEAD_STATUS_CHANGED: &str = "lead_status_changed";
    pub const LEAD_REASSIGNED: &str = "lead_reassigned";
    pub const DEAL_CREATED: &str = "deal_created";
    pub const DEAL_STAGE_CHANGED: &str = "deal_stage_changed";
    pub const TASK_CREATED: &str = "task_created";
    pub const TASK_COMPLETED: &str = "task_completed";
    pub const TASK_CANCELLED: &str = "task_cancelled";
    pub const MANUAL_ACTIVITY: &str = "manual_activity";
}

/// Discriminator distinguishing which collection an activity concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lead,
    Deal,
    Task,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Deal => "deal",
            Self::Task => "task",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "lead" => Some(Self::Lead),
            "deal" => Some(Self::Deal),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

/// Raw activity-log row.
///
/// `entity_type` is kept as the stored string so rows with discriminators
/// this version does not know about still round-trip; [`Self::entity_kind`]
/// yields the typed view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action_type: String,
    /// Populated only for manually logged activities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Open payload; shape depends on `action_type`.
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub entity_type: String,
    pub entity_id: String,
    pub actor_id: String,
    /// Display name of the actor, resolved at query time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
}

impl ActivityRecord {
    /// Typed view of the discriminator; `None` for unknown values.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        EntityKind::parse(&self.entity_type)
    }
}

/// Payload for appending to the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub action_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub actor_id: String,
}

/// The entity an activity points at, resolved by the feed service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LinkedEntity {
    Lead(LeadSummary),
    Deal(DealSummary),
    Task(TaskSummary),
}

/// An activity row plus the two fields derived by the feed service.
///
/// `resolved_source` is always a known [`super::lead::LeadSource`] spelling
/// or the literal fallback `"Other"`; never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedActivity {
    #[serde(flatten)]
    pub activity: ActivityRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_entity: Option<LinkedEntity>,
    pub resolved_source: String,
}

/// Feed query filters. The `source` filter applies to the resolved label
/// after enrichment; everything else is pushed down to storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityFilters {
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entity_type: Option<EntityKind>,
    #[serde(default)]
    pub source: Option<String>,
}

/// One page of the enriched global feed.
///
/// `total_count` is the storage-side match count and is unaffected by the
/// post-enrichment source filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub activities: Vec<EnrichedActivity>,
    pub total_count: u64,
}
