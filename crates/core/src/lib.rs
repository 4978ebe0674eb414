//! # Salesdesk Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - Use cases and services
//!
//! ## Architecture Principles
//! - Only depends on `salesdesk-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod dashboard;
pub mod deals;
pub mod feed;
pub mod leads;
pub mod tasks;

// Re-export specific items to avoid ambiguity
pub use dashboard::ports::DashboardQueries;
pub use dashboard::DashboardService;
pub use deals::ports::DealStore;
pub use deals::DealService;
pub use feed::ports::{ActivityLog, DealLookup, LeadLookup, TaskLookup, TeamDirectory};
pub use feed::ActivityFeedService;
pub use leads::ports::LeadStore;
pub use leads::LeadService;
pub use tasks::ports::{TaskScope, TaskStore};
pub use tasks::TaskService;
