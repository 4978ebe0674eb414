//! Lead types
//!
//! A lead is a prospective client. Every lead carries an acquisition
//! channel ([`LeadSource`]) that deals and tasks inherit transitively
//! through their lead linkage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lead acquisition channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadSource {
    Upwork,
    Freelancer,
    Recruitment,
    B2B,
    Referral,
}

impl LeadSource {
    /// Canonical spelling used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upwork => "Upwork",
            Self::Freelancer => "Freelancer",
            Self::Recruitment => "Recruitment",
            Self::B2B => "B2B",
            Self::Referral => "Referral",
        }
    }

    /// Parse a stored spelling back into the enum. Unknown values map to
    /// `None` rather than an error; legacy rows may carry anything.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Upwork" => Some(Self::Upwork),
            "Freelancer" => Some(Self::Freelancer),
            "Recruitment" => Some(Self::Recruitment),
            "B2B" => Some(Self::B2B),
            "Referral" => Some(Self::Referral),
            _ => None,
        }
    }
}

/// Lead pipeline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    Applied,
    Conversation,
    Interview,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Conversation => "Conversation",
            Self::Interview => "Interview",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Applied" => Some(Self::Applied),
            "Conversation" => Some(Self::Conversation),
            "Interview" => Some(Self::Interview),
            "Won" => Some(Self::Won),
            "Lost" => Some(Self::Lost),
            _ => None,
        }
    }

    /// Won and Lost leads are terminal; everything else counts as active
    /// for dashboard purposes.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for LeadStatus {
    fn default() -> Self {
        Self::Applied
    }
}

/// Full lead record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LeadSource>,
    pub status: LeadStatus,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub source: Option<LeadSource>,
    #[serde(default)]
    pub status: LeadStatus,
    pub owner_id: String,
}

/// Minimal lead projection used by the activity feed resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LeadSource>,
}

/// List-view filters for leads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadFilters {
    /// Free-text search over name and company.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub source: Option<LeadSource>,
    #[serde(default)]
    pub owner_id: Option<String>,
}
