// Branch domain model - a tenant-scoped intake point with its own
// public landing page
use serde::{Deserialize, Serialize};

/// Branch-owned theming and copy for the public landing page. Stored as
/// JSON on the branch row; every field has a safe default so a missing
/// or partial blob still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LandingTheme {
    pub title: String,
    pub subtitle: String,
    pub primary_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub consent_text: String,
    pub submit_label: String,
}

impl Default for LandingTheme {
    fn default() -> Self {
        Self {
            title: "Request a consultation".to_string(),
            subtitle: "Leave your number and we will call you back".to_string(),
            primary_color: "#2563eb".to_string(),
            logo_url: None,
            consent_text: "I agree to the processing of my personal information".to_string(),
            submit_label: "Submit".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    /// URL path segment of the public landing page.
    pub slug: String,
    pub is_active: bool,
    #[serde(default)]
    pub landing: LandingTheme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_landing_theme_fills_defaults() {
        let theme: LandingTheme =
            serde_json::from_str(r##"{"title": "Branch A", "primaryColor": "#111"}"##).unwrap();
        assert_eq!(theme.title, "Branch A");
        assert_eq!(theme.primary_color, "#111");
        assert_eq!(theme.submit_label, LandingTheme::default().submit_label);
    }
}
