// User account domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::permission::{PermissionMode, PermissionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub permission_mode: PermissionMode,
    #[serde(default)]
    pub custom_permissions: PermissionSet,
    #[serde(default)]
    pub memo: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn effective_permissions(&self) -> PermissionSet {
        PermissionSet::effective(self.permission_mode, self.role, &self.custom_permissions)
    }
}

/// Account PINs are exactly 4 numeric digits. The auth provider adapter
/// expands them into a synthetic email/password pair.
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit())
}
