// Dashboard composition endpoints
//
// Widgets are served with their size tier and resolved design tokens
// attached so the client renders straight from the response instead of
// re-deriving presentation constants.
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::error::ServiceError;
use crate::domain::color_rules::ColorRule;
use crate::domain::layout::DashboardLayout;
use crate::domain::tokens::{DesignTokens, StyleOverrides};
use crate::domain::widget::{DataBinding, GridPosition, GridSize, SizeTier, WidgetConfig, WidgetKind};
use crate::presentation::app_state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    #[serde(flatten)]
    pub config: WidgetConfig,
    pub tier: SizeTier,
    pub resolved_tokens: DesignTokens,
}

impl From<WidgetConfig> for WidgetView {
    fn from(config: WidgetConfig) -> Self {
        Self {
            tier: config.tier(),
            resolved_tokens: config.resolved_tokens(),
            config,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub widgets: Vec<WidgetView>,
}

fn layout_response(layout: DashboardLayout) -> LayoutResponse {
    LayoutResponse {
        widgets: layout.widgets.into_iter().map(WidgetView::from).collect(),
    }
}

pub async fn get_layout(State(state): State<Arc<AppState>>) -> Json<LayoutResponse> {
    Json(layout_response(state.layout_service.load().await))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceLayoutRequest {
    pub widgets: Vec<WidgetConfig>,
}

pub async fn replace_layout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReplaceLayoutRequest>,
) -> Result<Json<LayoutResponse>, ServiceError> {
    let layout = state.layout_service.replace(request.widgets).await?;
    Ok(Json(layout_response(layout)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWidgetRequest {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub size: GridSize,
    pub data_binding: DataBinding,
}

pub async fn add_widget(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddWidgetRequest>,
) -> Result<Json<WidgetView>, ServiceError> {
    let placed = state
        .layout_service
        .add_widget(request.kind, request.size, request.data_binding)
        .await?;
    Ok(Json(WidgetView::from(placed)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWidgetRequest {
    /// Position and size move together (a drag or a resize).
    pub position: Option<GridPosition>,
    pub size: Option<GridSize>,
    /// An empty overrides object clears the overrides.
    pub style_overrides: Option<StyleOverrides>,
    pub color_rules: Option<Vec<ColorRule>>,
}

pub async fn update_widget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateWidgetRequest>,
) -> Result<Json<WidgetView>, ServiceError> {
    if let (Some(position), Some(size)) = (request.position, request.size) {
        state.layout_service.move_widget(&id, position, size).await?;
    }
    if let Some(overrides) = request.style_overrides {
        let overrides = (overrides != StyleOverrides::default()).then_some(overrides);
        state.layout_service.set_style_overrides(&id, overrides).await?;
    }
    if let Some(rules) = request.color_rules {
        state.layout_service.set_color_rules(&id, rules).await?;
    }

    let layout = state.layout_service.load().await;
    let widget = layout
        .get(&id)
        .cloned()
        .ok_or(ServiceError::NotFound("widget"))?;
    Ok(Json(WidgetView::from(widget)))
}

pub async fn remove_widget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.layout_service.remove_widget(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDataResponse {
    pub value: f64,
    pub change_percent: Option<f64>,
    pub color: Option<WidgetColor>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetColor {
    pub color: String,
    pub bg_color: String,
    pub label: Option<String>,
}

pub async fn widget_data(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WidgetDataResponse>, ServiceError> {
    let layout = state.layout_service.load().await;
    let widget = layout.get(&id).ok_or(ServiceError::NotFound("widget"))?;

    let data = state.dashboard_service.widget_data(widget).await?;
    Ok(Json(WidgetDataResponse {
        value: data.value,
        change_percent: data.change_percent,
        color: data.color.map(|c| WidgetColor {
            color: c.color,
            bg_color: c.bg_color,
            label: c.label,
        }),
    }))
}
