// Tier-derived design tokens and per-widget style overrides
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::widget::SizeTier;

/// Token category. Stat-style widgets (single value, gauge) and
/// chart-style widgets (plots, lists, tables) carry different constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetCategory {
    Stat,
    Chart,
}

/// Presentation constants resolved for one (category, tier) pair.
/// Sizes and paddings are CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTokens {
    pub title_size: u32,
    pub value_size: u32,
    pub icon_size: u32,
    pub header_padding: u32,
    pub content_padding: u32,
    pub axis_font_size: u32,
    pub bar_radius: u32,
}

impl DesignTokens {
    /// Token table, exhaustive over the (category, tier) space. A missing
    /// entry is a compile error here, never a runtime fallback.
    pub const fn for_widget(category: WidgetCategory, tier: SizeTier) -> Self {
        use SizeTier::*;
        use WidgetCategory::*;
        match (category, tier) {
            (Stat, Micro) => Self {
                title_size: 10,
                value_size: 16,
                icon_size: 12,
                header_padding: 4,
                content_padding: 4,
                axis_font_size: 8,
                bar_radius: 2,
            },
            (Stat, UltraCompact) => Self {
                title_size: 11,
                value_size: 20,
                icon_size: 14,
                header_padding: 6,
                content_padding: 6,
                axis_font_size: 9,
                bar_radius: 2,
            },
            (Stat, Compact) => Self {
                title_size: 12,
                value_size: 24,
                icon_size: 16,
                header_padding: 8,
                content_padding: 8,
                axis_font_size: 10,
                bar_radius: 3,
            },
            (Stat, Normal) => Self {
                title_size: 14,
                value_size: 30,
                icon_size: 20,
                header_padding: 12,
                content_padding: 12,
                axis_font_size: 11,
                bar_radius: 4,
            },
            (Stat, Spacious) => Self {
                title_size: 16,
                value_size: 38,
                icon_size: 24,
                header_padding: 16,
                content_padding: 16,
                axis_font_size: 12,
                bar_radius: 4,
            },
            (Chart, Micro) => Self {
                title_size: 10,
                value_size: 12,
                icon_size: 10,
                header_padding: 4,
                content_padding: 2,
                axis_font_size: 8,
                bar_radius: 2,
            },
            (Chart, UltraCompact) => Self {
                title_size: 11,
                value_size: 13,
                icon_size: 12,
                header_padding: 6,
                content_padding: 4,
                axis_font_size: 9,
                bar_radius: 3,
            },
            (Chart, Compact) => Self {
                title_size: 12,
                value_size: 14,
                icon_size: 14,
                header_padding: 8,
                content_padding: 6,
                axis_font_size: 10,
                bar_radius: 4,
            },
            (Chart, Normal) => Self {
                title_size: 14,
                value_size: 16,
                icon_size: 16,
                header_padding: 12,
                content_padding: 10,
                axis_font_size: 11,
                bar_radius: 6,
            },
            (Chart, Spacious) => Self {
                title_size: 16,
                value_size: 18,
                icon_size: 20,
                header_padding: 16,
                content_padding: 14,
                axis_font_size: 12,
                bar_radius: 8,
            },
        }
    }
}

/// A single overridable size field: an explicit pixel value, or the
/// `auto` sentinel meaning "keep the tier-derived token".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeOverride {
    Auto,
    Px(u32),
}

impl Serialize for SizeOverride {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SizeOverride::Auto => serializer.serialize_str("auto"),
            SizeOverride::Px(px) => serializer.serialize_u32(*px),
        }
    }
}

impl<'de> Deserialize<'de> for SizeOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Px(u32),
            Word(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Px(px) => Ok(SizeOverride::Px(px)),
            Raw::Word(word) if word == "auto" => Ok(SizeOverride::Auto),
            Raw::Word(word) => Err(de::Error::custom(format!(
                "unknown size keyword '{}', expected a number or 'auto'",
                word
            ))),
        }
    }
}

/// User-authored per-widget overrides. Each field independently replaces
/// the tier-derived token; absence and the `auto` sentinel both keep the
/// base value. Color fields have no tier base - absence means the
/// renderer uses its own default styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_size: Option<SizeOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_size: Option<SizeOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<SizeOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SizeOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_color: Option<String>,
}

impl StyleOverrides {
    /// Merge onto tier-derived tokens, field by field. `spacing` drives
    /// both paddings; the color fields are not part of the token record
    /// and pass through untouched.
    pub fn apply(&self, base: DesignTokens) -> DesignTokens {
        let mut tokens = base;
        if let Some(SizeOverride::Px(px)) = self.title_size {
            tokens.title_size = px;
        }
        if let Some(SizeOverride::Px(px)) = self.value_size {
            tokens.value_size = px;
        }
        if let Some(SizeOverride::Px(px)) = self.icon_size {
            tokens.icon_size = px;
        }
        if let Some(SizeOverride::Px(px)) = self.spacing {
            tokens.header_padding = px;
            tokens.content_padding = px;
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DesignTokens {
        DesignTokens::for_widget(WidgetCategory::Stat, SizeTier::Normal)
    }

    #[test]
    fn no_overrides_keeps_base() {
        let overrides = StyleOverrides::default();
        assert_eq!(overrides.apply(base()), base());
    }

    #[test]
    fn auto_sentinel_keeps_tier_value() {
        let overrides = StyleOverrides {
            value_size: Some(SizeOverride::Auto),
            ..StyleOverrides::default()
        };
        assert_eq!(overrides.apply(base()).value_size, base().value_size);
    }

    #[test]
    fn override_is_field_independent() {
        let overrides = StyleOverrides {
            value_size: Some(SizeOverride::Px(48)),
            ..StyleOverrides::default()
        };
        let resolved = overrides.apply(base());
        assert_eq!(resolved.value_size, 48);
        assert_eq!(resolved.title_size, base().title_size);
        assert_eq!(resolved.icon_size, base().icon_size);
    }

    #[test]
    fn spacing_drives_both_paddings() {
        let overrides = StyleOverrides {
            spacing: Some(SizeOverride::Px(20)),
            ..StyleOverrides::default()
        };
        let resolved = overrides.apply(base());
        assert_eq!(resolved.header_padding, 20);
        assert_eq!(resolved.content_padding, 20);
    }

    #[test]
    fn size_override_wire_format() {
        let auto: SizeOverride = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(auto, SizeOverride::Auto);
        let px: SizeOverride = serde_json::from_str("18").unwrap();
        assert_eq!(px, SizeOverride::Px(18));
        assert!(serde_json::from_str::<SizeOverride>("\"huge\"").is_err());

        assert_eq!(serde_json::to_string(&SizeOverride::Auto).unwrap(), "\"auto\"");
        assert_eq!(serde_json::to_string(&SizeOverride::Px(18)).unwrap(), "18");
    }

    #[test]
    fn token_table_is_total() {
        // Every (category, tier) pair resolves; the match in for_widget
        // is exhaustive so this is a smoke test of the values.
        for category in [WidgetCategory::Stat, WidgetCategory::Chart] {
            for tier in [
                SizeTier::Micro,
                SizeTier::UltraCompact,
                SizeTier::Compact,
                SizeTier::Normal,
                SizeTier::Spacious,
            ] {
                let tokens = DesignTokens::for_widget(category, tier);
                assert!(tokens.title_size > 0);
                assert!(tokens.value_size > 0);
            }
        }
    }

    #[test]
    fn larger_tiers_never_shrink_type() {
        for category in [WidgetCategory::Stat, WidgetCategory::Chart] {
            let tiers = [
                SizeTier::Micro,
                SizeTier::UltraCompact,
                SizeTier::Compact,
                SizeTier::Normal,
                SizeTier::Spacious,
            ];
            for pair in tiers.windows(2) {
                let small = DesignTokens::for_widget(category, pair[0]);
                let large = DesignTokens::for_widget(category, pair[1]);
                assert!(large.title_size >= small.title_size);
                assert!(large.value_size >= small.value_size);
            }
        }
    }
}
