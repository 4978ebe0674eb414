//! Task routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use salesdesk_domain::constants::LIST_PAGE_SIZE;
use salesdesk_domain::{Caller, NewTask, Role, Task, TaskFilters, TaskType, TaskView};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub view: TaskView,
    // Caller identity, threaded explicitly (session handling is external).
    pub user_id: String,
    pub role: Role,
    pub department: String,
    pub search: Option<String>,
    pub task_type: Option<TaskType>,
    pub owner: Option<String>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "list_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub tasks: Vec<Task>,
    pub count: u64,
}

/// GET /tasks - pending tasks for the requested view, soonest first.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let caller =
        Caller { user_id: params.user_id, role: params.role, department: params.department };
    let filters = TaskFilters {
        search: params.search,
        task_type: params.task_type,
        owner_id: params.owner,
    };

    let (tasks, count) =
        ctx.tasks.list(params.view, &caller, &filters, params.page, params.page_size).await?;
    Ok(Json(ListResponse { tasks, count }))
}

/// GET /tasks/{id}
pub async fn get_one(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = ctx.tasks.get(&id).await?;
    Ok(Json(task))
}

/// POST /tasks
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    info!(task_type = body.task_type.as_str(), "creating task");
    let task = ctx.tasks.create(body).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Debug, Deserialize)]
pub struct CompleteBody {
    pub actor_id: String,
}

/// PUT /tasks/{id}/complete
pub async fn complete(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<CompleteBody>,
) -> Result<Json<Task>, ApiError> {
    info!(task = %id, "completing task");
    let task = ctx.tasks.complete(&id, &body.actor_id).await?;
    Ok(Json(task))
}

#[derive(Debug, Deserialize)]
pub struct CancelBody {
    pub reason: String,
    pub actor_id: String,
}

/// PUT /tasks/{id}/cancel
pub async fn cancel(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<CancelBody>,
) -> Result<Json<Task>, ApiError> {
    info!(task = %id, "cancelling task");
    let task = ctx.tasks.cancel(&id, &body.reason, &body.actor_id).await?;
    Ok(Json(task))
}

fn first_page() -> u32 {
    1
}

fn list_page_size() -> u32 {
    LIST_PAGE_SIZE
}
