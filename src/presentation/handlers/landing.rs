// Public landing page payload - branch theming and copy by slug
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::application::error::ServiceError;
use crate::domain::branch::LandingTheme;
use crate::presentation::app_state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    pub branch_id: String,
    pub branch_name: String,
    pub slug: String,
    pub theme: LandingTheme,
}

/// Unauthenticated. Inactive branches 404 like unknown slugs so a closed
/// branch's landing page simply disappears.
pub async fn landing(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<LandingResponse>, ServiceError> {
    let branch = state
        .branches
        .get_by_slug(&slug)
        .await
        .map_err(ServiceError::Backend)?
        .filter(|b| b.is_active)
        .ok_or(ServiceError::NotFound("landing page"))?;

    Ok(Json(LandingResponse {
        branch_id: branch.id,
        branch_name: branch.name,
        slug: branch.slug,
        theme: branch.landing,
    }))
}
