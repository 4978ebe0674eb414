//! HTTP routes

pub mod activity;
pub mod dashboard;
pub mod deals;
pub mod leads;
pub mod tasks;
pub mod team;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, put};
use axum::Json;
use axum::Router;
use serde_json::json;

use crate::error::ApiError;
use crate::AppContext;

/// Build the full application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/activity", get(activity::feed).post(activity::log_manual))
        .route("/leads", get(leads::list).post(leads::create))
        .route("/leads/{id}", get(leads::get_one))
        .route("/leads/{id}/timeline", get(leads::timeline))
        .route("/leads/{id}/status", put(leads::change_status))
        .route("/leads/{id}/owner", put(leads::reassign))
        .route("/deals", get(deals::list).post(deals::create))
        .route("/deals/{id}", get(deals::get_one))
        .route("/deals/{id}/timeline", get(deals::timeline))
        .route("/deals/{id}/stage", put(deals::change_stage))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route("/tasks/{id}", get(tasks::get_one))
        .route("/tasks/{id}/complete", put(tasks::complete))
        .route("/tasks/{id}/cancel", put(tasks::cancel))
        .route("/dashboard/metrics", get(dashboard::metrics))
        .route("/team/members", get(team::members))
        .with_state(ctx)
}

/// GET /health - database connectivity probe.
async fn health(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ctx.db.health_check()?;
    Ok(Json(json!({ "status": "ok" })))
}
