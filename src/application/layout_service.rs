// Layout service - the dashboard composition store
//
// The whole composition is persisted as one JSON blob in the settings
// store. Loads degrade to the preset layout instead of erroring; saves
// surface failures to the caller and leave the stored blob untouched.
use std::sync::Arc;

use anyhow::Context;

use crate::application::error::ServiceError;
use crate::application::repositories::SettingsRepository;
use crate::domain::color_rules::ColorRule;
use crate::domain::layout::DashboardLayout;
use crate::domain::tokens::StyleOverrides;
use crate::domain::widget::{DataBinding, GridPosition, GridSize, WidgetConfig, WidgetKind};

pub const LAYOUT_SETTINGS_KEY: &str = "dashboard_layout";

#[derive(Clone)]
pub struct LayoutService {
    settings: Arc<dyn SettingsRepository>,
}

impl LayoutService {
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        Self { settings }
    }

    /// Load the persisted composition. Missing or malformed blobs fall
    /// back to the preset layout so the dashboard always renders.
    pub async fn load(&self) -> DashboardLayout {
        match self.settings.get(LAYOUT_SETTINGS_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<DashboardLayout>(value) {
                Ok(layout) => layout,
                Err(e) => {
                    tracing::warn!(error = %e, "stored dashboard layout is malformed, using preset");
                    DashboardLayout::preset_default()
                }
            },
            Ok(None) => DashboardLayout::preset_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load dashboard layout, using preset");
                DashboardLayout::preset_default()
            }
        }
    }

    pub async fn save(&self, layout: &DashboardLayout) -> Result<(), ServiceError> {
        let value = serde_json::to_value(layout)
            .context("failed to serialize dashboard layout")
            .map_err(ServiceError::Backend)?;
        self.settings.put(LAYOUT_SETTINGS_KEY, value).await?;
        Ok(())
    }

    pub async fn add_widget(
        &self,
        kind: WidgetKind,
        size: GridSize,
        data_binding: DataBinding,
    ) -> Result<WidgetConfig, ServiceError> {
        let mut layout = self.load().await;
        let placed = layout.add_widget(kind, size, data_binding)?.clone();
        self.save(&layout).await?;
        Ok(placed)
    }

    pub async fn remove_widget(&self, id: &str) -> Result<(), ServiceError> {
        let mut layout = self.load().await;
        layout.remove_widget(id)?;
        self.save(&layout).await
    }

    pub async fn move_widget(
        &self,
        id: &str,
        position: GridPosition,
        size: GridSize,
    ) -> Result<(), ServiceError> {
        let mut layout = self.load().await;
        layout.move_widget(id, position, size)?;
        self.save(&layout).await
    }

    pub async fn set_style_overrides(
        &self,
        id: &str,
        overrides: Option<StyleOverrides>,
    ) -> Result<(), ServiceError> {
        let mut layout = self.load().await;
        layout.set_style_overrides(id, overrides)?;
        self.save(&layout).await
    }

    pub async fn set_color_rules(
        &self,
        id: &str,
        rules: Vec<ColorRule>,
    ) -> Result<(), ServiceError> {
        let mut layout = self.load().await;
        layout.set_color_rules(id, rules)?;
        self.save(&layout).await
    }

    /// Bulk-replace on preset load.
    pub async fn replace(&self, widgets: Vec<WidgetConfig>) -> Result<DashboardLayout, ServiceError> {
        let mut layout = self.load().await;
        layout.replace_all(widgets)?;
        self.save(&layout).await?;
        Ok(layout)
    }
}
