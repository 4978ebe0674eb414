//! # Salesdesk API
//!
//! HTTP surface exposing the CRM services as JSON endpoints.
//!
//! This crate contains:
//! - The application context (dependency wiring)
//! - Route handlers for feed, leads, deals, tasks, dashboard, team
//! - Domain error to HTTP status mapping
//!
//! Identity and role arrive as explicit request parameters; session
//! handling lives with an external collaborator.

pub mod context;
pub mod error;
pub mod routes;

pub use context::AppContext;
pub use error::ApiError;
pub use routes::router;
