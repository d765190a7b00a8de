// Widget configuration domain model
use serde::{Deserialize, Serialize};

use crate::domain::color_rules::ColorRule;
use crate::domain::tokens::{DesignTokens, StyleOverrides, WidgetCategory};

/// Number of columns in the dashboard grid.
pub const GRID_COLUMNS: u32 = 12;

/// Position of a widget on the dashboard grid, in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
}

impl GridPosition {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Widget footprint in grid units (columns x rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub w: u32,
    pub h: u32,
}

impl GridSize {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> u32 {
        self.w * self.h
    }
}

/// Presentation-density bucket derived from a widget's grid area.
///
/// Ordered from smallest to largest footprint; the derived `Ord` follows
/// declaration order, which the tier thresholds rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    Micro,
    UltraCompact,
    Compact,
    Normal,
    Spacious,
}

impl SizeTier {
    /// Resolve the presentation tier for a widget footprint.
    ///
    /// Total over positive integers: the top tier is unbounded, so every
    /// area maps to exactly one tier. Recomputed on every layout pass,
    /// never stored.
    pub fn resolve(w: u32, h: u32) -> Self {
        match GridSize::new(w, h).area() {
            0..=2 => SizeTier::Micro,
            3..=4 => SizeTier::UltraCompact,
            5..=6 => SizeTier::Compact,
            7..=12 => SizeTier::Normal,
            _ => SizeTier::Spacious,
        }
    }
}

/// The kind of widget placed on the dashboard. Determines which renderer
/// the client picks and which token category applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Stat,
    Gauge,
    GoalProgress,
    LineChart,
    BarChart,
    AreaChart,
    DonutChart,
    FunnelChart,
    CallbackList,
    StaleList,
    IncompleteList,
    Timeline,
    PerformanceTable,
}

impl WidgetKind {
    /// Token category for this widget kind. Single-value widgets use the
    /// stat tables; everything that plots or lists uses the chart tables.
    pub fn category(&self) -> WidgetCategory {
        match self {
            WidgetKind::Stat | WidgetKind::Gauge | WidgetKind::GoalProgress => {
                WidgetCategory::Stat
            }
            WidgetKind::LineChart
            | WidgetKind::BarChart
            | WidgetKind::AreaChart
            | WidgetKind::DonutChart
            | WidgetKind::FunnelChart
            | WidgetKind::CallbackList
            | WidgetKind::StaleList
            | WidgetKind::IncompleteList
            | WidgetKind::Timeline
            | WidgetKind::PerformanceTable => WidgetCategory::Chart,
        }
    }
}

/// What a widget shows: a metric name understood by the dashboard
/// aggregation endpoints plus free-form parameters (date range, assignee).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBinding {
    pub metric: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl DataBinding {
    pub fn metric(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            params: serde_json::Map::new(),
        }
    }
}

/// A placed dashboard widget - the unit of dashboard composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub position: GridPosition,
    pub size: GridSize,
    pub data_binding: DataBinding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_overrides: Option<StyleOverrides>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub color_rules: Vec<ColorRule>,
}

impl WidgetConfig {
    /// Tier for the widget's current footprint.
    pub fn tier(&self) -> SizeTier {
        SizeTier::resolve(self.size.w, self.size.h)
    }

    /// Tier-derived tokens with the widget's own overrides applied.
    pub fn resolved_tokens(&self) -> DesignTokens {
        let base = DesignTokens::for_widget(self.kind.category(), self.tier());
        match &self.style_overrides {
            Some(overrides) => overrides.apply(base),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_pinned_examples() {
        assert_eq!(SizeTier::resolve(1, 1), SizeTier::Micro);
        assert_eq!(SizeTier::resolve(2, 2), SizeTier::UltraCompact);
        assert_eq!(SizeTier::resolve(3, 2), SizeTier::Compact);
        assert_eq!(SizeTier::resolve(4, 3), SizeTier::Normal);
        assert_eq!(SizeTier::resolve(6, 4), SizeTier::Spacious);
    }

    #[test]
    fn tier_monotonic_in_area() {
        let mut sizes: Vec<(u32, u32)> = Vec::new();
        for w in 1..=GRID_COLUMNS {
            for h in 1..=8 {
                sizes.push((w, h));
            }
        }
        sizes.sort_by_key(|(w, h)| w * h);

        let mut last = SizeTier::Micro;
        for (w, h) in sizes {
            let tier = SizeTier::resolve(w, h);
            assert!(
                tier >= last,
                "tier regressed at {}x{}: {:?} < {:?}",
                w,
                h,
                tier,
                last
            );
            last = tier;
        }
    }

    #[test]
    fn widget_kind_categories() {
        assert_eq!(WidgetKind::Stat.category(), WidgetCategory::Stat);
        assert_eq!(WidgetKind::Gauge.category(), WidgetCategory::Stat);
        assert_eq!(WidgetKind::LineChart.category(), WidgetCategory::Chart);
        assert_eq!(WidgetKind::PerformanceTable.category(), WidgetCategory::Chart);
    }

    #[test]
    fn widget_kind_wire_names() {
        let json = serde_json::to_string(&WidgetKind::PerformanceTable).unwrap();
        assert_eq!(json, "\"performance_table\"");
    }
}
