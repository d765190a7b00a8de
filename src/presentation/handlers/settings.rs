// Settings blob endpoints
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::application::error::ServiceError;
use crate::presentation::app_state::AppState;

pub async fn get_blob(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(Json(state.settings_service.get(&key).await?))
}

pub async fn put_blob(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<StatusCode, ServiceError> {
    state.settings_service.put(&key, value).await?;
    Ok(StatusCode::NO_CONTENT)
}
