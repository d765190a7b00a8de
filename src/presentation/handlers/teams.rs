// Team endpoints - listing, creation, memo, member moves
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::application::error::ServiceError;
use crate::application::org_service::NewTeam;
use crate::domain::team::Team;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::users::MemoRequest;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Team>>, ServiceError> {
    Ok(Json(state.org_service.list_teams().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: String,
    pub branch_id: String,
    pub leader_id: Option<String>,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTeamRequest>,
) -> Result<Json<Team>, ServiceError> {
    let team = state
        .org_service
        .create_team(NewTeam {
            name: request.name,
            branch_id: request.branch_id,
            leader_id: request.leader_id,
        })
        .await?;
    Ok(Json(team))
}

pub async fn update_memo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<MemoRequest>,
) -> Result<Json<Team>, ServiceError> {
    let team = state.org_service.update_team_memo(&id, request.memo).await?;
    Ok(Json(team))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMemberRequest {
    pub user_id: String,
}

/// Drag-and-drop reassignment: one write, the client refreshes only
/// after success.
pub async fn move_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<MoveMemberRequest>,
) -> Result<Json<Team>, ServiceError> {
    let team = state.org_service.move_member(&request.user_id, &id).await?;
    Ok(Json(team))
}
