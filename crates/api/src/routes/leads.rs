//! Lead routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use salesdesk_domain::constants::LIST_PAGE_SIZE;
use salesdesk_domain::{
    ActivityRecord, EntityKind, Lead, LeadFilters, LeadSource, LeadStatus, NewLead,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub owner: Option<String>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "list_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub leads: Vec<Lead>,
    pub count: u64,
}

/// GET /leads - filtered, paginated list.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let filters = LeadFilters {
        search: params.search,
        status: params.status,
        source: params.source,
        owner_id: params.owner,
    };

    let (leads, count) = ctx.leads.list(&filters, params.page, params.page_size).await?;
    Ok(Json(ListResponse { leads, count }))
}

/// GET /leads/{id}
pub async fn get_one(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Lead>, ApiError> {
    let lead = ctx.leads.get(&id).await?;
    Ok(Json(lead))
}

/// POST /leads
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<NewLead>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    info!(name = %body.name, "creating lead");
    let lead = ctx.leads.create(body).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// GET /leads/{id}/timeline - entity activities plus linked-task activities.
pub async fn timeline(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError> {
    let rows = ctx.feed.entity_timeline(EntityKind::Lead, &id).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: LeadStatus,
    pub actor_id: String,
}

/// PUT /leads/{id}/status
pub async fn change_status(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Lead>, ApiError> {
    info!(lead = %id, status = body.status.as_str(), "changing lead status");
    let lead = ctx.leads.change_status(&id, body.status, &body.actor_id).await?;
    Ok(Json(lead))
}

#[derive(Debug, Deserialize)]
pub struct ReassignBody {
    pub owner_id: String,
    pub note: Option<String>,
    pub actor_id: String,
}

/// PUT /leads/{id}/owner - handover to another owner.
pub async fn reassign(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<ReassignBody>,
) -> Result<Json<Lead>, ApiError> {
    info!(lead = %id, new_owner = %body.owner_id, "reassigning lead");
    let lead =
        ctx.leads.reassign(&id, &body.owner_id, body.note.as_deref(), &body.actor_id).await?;
    Ok(Json(lead))
}

fn first_page() -> u32 {
    1
}

fn list_page_size() -> u32 {
    LIST_PAGE_SIZE
}
