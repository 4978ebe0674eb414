//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

/// Attribution label used when no acquisition source can be resolved.
///
/// The feed invariant requires `resolved_source` to always carry either a
/// known [`crate::types::LeadSource`] spelling or this literal.
pub const FALLBACK_SOURCE: &str = "Other";

/// Page size for the global activity feed.
pub const FEED_PAGE_SIZE: u32 = 50;

/// Page size for the lead/deal/task list views.
pub const LIST_PAGE_SIZE: u32 = 20;
