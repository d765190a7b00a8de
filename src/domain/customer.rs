// Customer (sales lead) domain model and phone number rules
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lead lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    New,
    InProgress,
    CallBack,
    Converted,
    Closed,
}

impl CustomerStatus {
    pub const ALL: [CustomerStatus; 5] = [
        CustomerStatus::New,
        CustomerStatus::InProgress,
        CustomerStatus::CallBack,
        CustomerStatus::Converted,
        CustomerStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::New => "new",
            CustomerStatus::InProgress => "in_progress",
            CustomerStatus::CallBack => "call_back",
            CustomerStatus::Converted => "converted",
            CustomerStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

/// UTM attribution captured from the landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtmAttribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Normalized phone number (digits only).
    pub phone: String,
    pub branch_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub status: CustomerStatus,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub utm: UtmAttribution,
    pub is_duplicate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_license: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_insurance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_credit_card: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_back_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// A lead is incomplete while it has no name or no assigned agent.
    pub fn is_incomplete(&self) -> bool {
        self.name.as_deref().map_or(true, |n| n.trim().is_empty()) || self.assigned_to.is_none()
    }
}

/// Strip every non-digit character ("010-1234-5678" becomes "01012345678").
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Korean mobile number check over an already-normalized string: `01`
/// followed by 8 or 9 digits. `010` numbers are always 11 digits; the
/// 10-digit form only exists for the legacy `011`/`016`-style prefixes.
pub fn is_valid_mobile(normalized: &str) -> bool {
    let len = normalized.len();
    if !(10..=11).contains(&len) {
        return false;
    }
    if !normalized.starts_with("01") || !normalized.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if normalized.starts_with("010") && len != 11 {
        return false;
    }
    true
}
