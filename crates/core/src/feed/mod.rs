//! Global activity feed
//!
//! Fetches pages of the activity log and enriches each row with the full
//! record of the lead, deal, or task it concerns, plus a resolved
//! acquisition-source label.

pub mod ports;
pub mod service;

pub use service::ActivityFeedService;
