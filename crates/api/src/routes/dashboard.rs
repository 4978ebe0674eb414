//! Dashboard routes

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use salesdesk_domain::DashboardMetrics;

use crate::error::ApiError;
use crate::AppContext;

/// GET /dashboard/metrics - the full dashboard payload.
pub async fn metrics(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<DashboardMetrics>, ApiError> {
    let today = Utc::now().date_naive();
    let metrics = ctx.dashboard.metrics(today).await?;
    Ok(Json(metrics))
}
