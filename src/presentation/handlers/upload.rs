// Branding upload endpoint - multipart form with `file` and `type`
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;

use crate::application::error::ServiceError;
use crate::presentation::app_state::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn branding(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServiceError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut asset_kind = "logo".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field
                    .content_type()
                    .ok_or_else(|| ServiceError::validation("file field is missing a content type"))?
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::validation(format!("failed to read upload: {e}")))?;
                file = Some((content_type, data));
            }
            Some("type") => {
                asset_kind = field
                    .text()
                    .await
                    .map_err(|e| ServiceError::validation(format!("failed to read type: {e}")))?;
            }
            _ => {}
        }
    }

    let (content_type, data) =
        file.ok_or_else(|| ServiceError::validation("file field is required"))?;
    let url = state
        .branding_store
        .store(&asset_kind, &content_type, data)
        .await?;
    Ok(Json(UploadResponse { url }))
}
