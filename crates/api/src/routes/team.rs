//! Team member routes

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use salesdesk_domain::{Role, TeamMember};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Deserialize)]
pub struct MemberParams {
    pub role: Option<Role>,
}

/// GET /team/members - profiles for filter controls and assignment flows.
pub async fn members(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<MemberParams>,
) -> Result<Json<Vec<TeamMember>>, ApiError> {
    let members = ctx.feed.list_team_members(params.role).await?;
    Ok(Json(members))
}
