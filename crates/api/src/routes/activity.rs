//! Global activity feed routes

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use salesdesk_domain::constants::FEED_PAGE_SIZE;
use salesdesk_domain::{ActivityFilters, EntityKind, FeedPage};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    /// Actor filter (profile id).
    pub user: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub entity_type: Option<EntityKind>,
    /// Resolved-source filter, applied after enrichment.
    pub source: Option<String>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "feed_page_size")]
    pub page_size: u32,
}

/// GET /activity - one enriched page of the global feed.
pub async fn feed(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, ApiError> {
    let filters = ActivityFilters {
        actor_id: params.user,
        start: params.start_date,
        end: params.end_date,
        entity_type: params.entity_type,
        source: params.source,
    };

    let page = ctx.feed.fetch_feed(&filters, params.page, params.page_size).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct ManualActivityBody {
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub activity_type: String,
    pub description: String,
    pub actor_id: String,
}

/// POST /activity - append a manually logged activity.
pub async fn log_manual(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ManualActivityBody>,
) -> Result<StatusCode, ApiError> {
    info!(
        entity_type = body.entity_type.as_str(),
        entity_id = %body.entity_id,
        "logging manual activity"
    );

    ctx.feed
        .record_manual(
            body.entity_type,
            &body.entity_id,
            &body.activity_type,
            &body.description,
            &body.actor_id,
        )
        .await?;

    Ok(StatusCode::CREATED)
}

fn first_page() -> u32 {
    1
}

fn feed_page_size() -> u32 {
    FEED_PAGE_SIZE
}
