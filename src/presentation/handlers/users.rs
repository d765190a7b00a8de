// User account endpoints - accounts, permissions, activity, memo
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::error::ServiceError;
use crate::application::org_service::{NewUser, PermissionsPatch, UserUpdate};
use crate::application::repositories::{PageRequest, Pagination};
use crate::domain::activity::ActivityEntry;
use crate::domain::permission::{PermissionMode, PermissionSet};
use crate::domain::user::{Role, User};
use crate::presentation::app_state::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ServiceError> {
    Ok(Json(state.org_service.list_users().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub branch_id: Option<String>,
    pub team_id: Option<String>,
    pub pin: String,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<User>, ServiceError> {
    let user = state
        .org_service
        .create_user(NewUser {
            username: request.username,
            display_name: request.display_name,
            role: request.role,
            branch_id: request.branch_id,
            team_id: request.team_id,
            pin: request.pin,
        })
        .await?;
    Ok(Json(user))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub id: String,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub branch_id: Option<String>,
    pub team_id: Option<String>,
    pub is_active: Option<bool>,
    pub pin: Option<String>,
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ServiceError> {
    let user = state
        .org_service
        .update_user(
            &request.id,
            UserUpdate {
                display_name: request.display_name,
                role: request.role,
                branch_id: request.branch_id,
                team_id: request.team_id,
                is_active: request.is_active,
                pin: request.pin,
            },
        )
        .await?;
    Ok(Json(user))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub permission_mode: PermissionMode,
    pub role: Role,
    pub permissions: PermissionSet,
}

pub async fn permissions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PermissionsResponse>, ServiceError> {
    let view = state.org_service.permissions(&id).await?;
    Ok(Json(PermissionsResponse {
        permission_mode: view.permission_mode,
        role: view.role,
        permissions: view.permissions,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsPatchRequest {
    pub permission_mode: Option<PermissionMode>,
    pub permissions: Option<PermissionSet>,
}

pub async fn update_permissions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<PermissionsPatchRequest>,
) -> Result<Json<PermissionsResponse>, ServiceError> {
    let view = state
        .org_service
        .update_permissions(
            &id,
            PermissionsPatch {
                permission_mode: request.permission_mode,
                permissions: request.permissions,
            },
        )
        .await?;
    Ok(Json(PermissionsResponse {
        permission_mode: view.permission_mode,
        role: view.role,
        permissions: view.permissions,
    }))
}

#[derive(Deserialize)]
pub struct ActivityQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub activities: Vec<ActivityEntry>,
    pub pagination: Pagination,
}

pub async fn activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>, ServiceError> {
    let page = state
        .org_service
        .activity(
            &id,
            PageRequest {
                page: query.page.unwrap_or(1),
                limit: query.limit.unwrap_or(20),
            },
        )
        .await?;
    Ok(Json(ActivityResponse {
        activities: page.entries,
        pagination: page.pagination,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendActivityRequest {
    pub action: String,
    pub detail: Option<String>,
}

pub async fn append_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<AppendActivityRequest>,
) -> Result<Json<ActivityEntry>, ServiceError> {
    let entry = state
        .org_service
        .append_activity(&id, request.action, request.detail)
        .await?;
    Ok(Json(entry))
}

#[derive(Deserialize)]
pub struct MemoRequest {
    pub memo: String,
}

pub async fn update_memo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<MemoRequest>,
) -> Result<Json<User>, ServiceError> {
    let user = state.org_service.update_user_memo(&id, request.memo).await?;
    Ok(Json(user))
}
