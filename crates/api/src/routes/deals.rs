//! Deal routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use salesdesk_domain::constants::LIST_PAGE_SIZE;
use salesdesk_domain::{ActivityRecord, Deal, DealFilters, DealStage, EntityKind, NewDeal};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub stage: Option<DealStage>,
    pub owner: Option<String>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "list_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub deals: Vec<Deal>,
    pub count: u64,
}

/// GET /deals - filtered, paginated list with lead expansion.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let filters =
        DealFilters { search: params.search, stage: params.stage, owner_id: params.owner };

    let (deals, count) = ctx.deals.list(&filters, params.page, params.page_size).await?;
    Ok(Json(ListResponse { deals, count }))
}

/// GET /deals/{id}
pub async fn get_one(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Deal>, ApiError> {
    let deal = ctx.deals.get(&id).await?;
    Ok(Json(deal))
}

/// POST /deals
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<NewDeal>,
) -> Result<(StatusCode, Json<Deal>), ApiError> {
    info!(name = %body.name, "creating deal");
    let deal = ctx.deals.create(body).await?;
    Ok((StatusCode::CREATED, Json(deal)))
}

/// GET /deals/{id}/timeline - entity activities plus linked-task activities.
pub async fn timeline(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError> {
    let rows = ctx.feed.entity_timeline(EntityKind::Deal, &id).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct StageBody {
    pub stage: DealStage,
    pub actor_id: String,
}

/// PUT /deals/{id}/stage
pub async fn change_stage(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<StageBody>,
) -> Result<Json<Deal>, ApiError> {
    info!(deal = %id, stage = body.stage.as_str(), "changing deal stage");
    let deal = ctx.deals.change_stage(&id, body.stage, &body.actor_id).await?;
    Ok(Json(deal))
}

fn first_page() -> u32 {
    1
}

fn list_page_size() -> u32 {
    LIST_PAGE_SIZE
}
