//! Task types
//!
//! A task may link directly to a lead, directly to a deal, both, or
//! neither. Both references are weak; the referenced record may be gone.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::deal::DealSummary;
use super::lead::LeadSummary;
use super::team::Role;

/// Kind of follow-up work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Call,
    Email,
    Message,
    Proposal,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Email => "Email",
            Self::Message => "Message",
            Self::Proposal => "Proposal",
            Self::FollowUp => "Follow-up",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Call" => Some(Self::Call),
            "Email" => Some(Self::Email),
            "Message" => Some(Self::Message),
            "Proposal" => Some(Self::Proposal),
            "Follow-up" => Some(Self::FollowUp),
            _ => None,
        }
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Full task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub task_type: TaskType,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub task_type: TaskType,
    pub description: String,
    pub due_date: NaiveDate,
    pub owner_id: String,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
}

/// Minimal task projection used by the activity feed resolver, carrying the
/// task's lead and deal expansions (the deal may itself carry a lead).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<LeadSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal: Option<DealSummary>,
}

/// Which slice of tasks a list request wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskView {
    My,
    Team,
}

impl Default for TaskView {
    fn default() -> Self {
        Self::My
    }
}

/// Identity and role of the requesting user, threaded through explicitly.
/// Session handling lives with an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
    pub department: String,
}

/// List-view filters for tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilters {
    /// Free-text search over the task description.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    /// Honored in the team view only.
    #[serde(default)]
    pub owner_id: Option<String>,
}
