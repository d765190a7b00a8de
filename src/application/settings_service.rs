// Settings service - typed access over the opaque configuration blobs
use std::sync::Arc;

use crate::application::error::ServiceError;
use crate::application::repositories::SettingsRepository;
use crate::domain::layout::DashboardLayout;

/// Every blob key the settings store serves. Closed list so a typo in a
/// request cannot create stray keys.
pub const KNOWN_KEYS: [&str; 8] = [
    "statusBadges",
    "categoryBadges",
    "columnLabels",
    "customColumns",
    "excel_grid_layout",
    "dashboard_layout",
    "branding",
    "goalSettings",
];

#[derive(Clone)]
pub struct SettingsService {
    settings: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        Self { settings }
    }

    /// Fetch a blob. A missing blob is `null`, not an error - clients
    /// fall back to their defaults.
    pub async fn get(&self, key: &str) -> Result<serde_json::Value, ServiceError> {
        Self::check_key(key)?;
        Ok(self
            .settings
            .get(key)
            .await?
            .unwrap_or(serde_json::Value::Null))
    }

    /// Store a blob. The dashboard layout key is structurally validated
    /// so a bad write cannot poison the composition store; every other
    /// blob is opaque client state.
    pub async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), ServiceError> {
        Self::check_key(key)?;
        if key == "dashboard_layout" {
            serde_json::from_value::<DashboardLayout>(value.clone())
                .map_err(|e| ServiceError::validation(format!("invalid dashboard layout: {e}")))?;
        }
        self.settings.put(key, value).await?;
        Ok(())
    }

    fn check_key(key: &str) -> Result<(), ServiceError> {
        if KNOWN_KEYS.contains(&key) {
            Ok(())
        } else {
            Err(ServiceError::validation(format!("unknown settings key '{key}'")))
        }
    }
}
