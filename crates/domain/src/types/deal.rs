//! Deal types
//!
//! A deal may carry a weak reference to at most one lead. The reference is
//! a lookup relation, not ownership; deals without a lead are valid.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::lead::LeadSummary;

/// Deal pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealStage {
    Prospecting,
    Qualification,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prospecting => "Prospecting",
            Self::Qualification => "Qualification",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Prospecting" => Some(Self::Prospecting),
            "Qualification" => Some(Self::Qualification),
            "Proposal" => Some(Self::Proposal),
            "Negotiation" => Some(Self::Negotiation),
            "Won" => Some(Self::Won),
            "Lost" => Some(Self::Lost),
            _ => None,
        }
    }
}

impl Default for DealStage {
    fn default() -> Self {
        Self::Prospecting
    }
}

/// Full deal record. List views expand the linked lead summary in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_date: Option<NaiveDate>,
    pub stage: DealStage,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<LeadSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDeal {
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    #[serde(default)]
    pub stage: DealStage,
    pub owner_id: String,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Minimal deal projection used by the activity feed resolver, carrying one
/// level of lead expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub stage: DealStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<LeadSummary>,
}

/// List-view filters for deals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealFilters {
    /// Free-text search over deal name and linked lead name/company.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub stage: Option<DealStage>,
    #[serde(default)]
    pub owner_id: Option<String>,
}
