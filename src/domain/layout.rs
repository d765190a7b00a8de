// Dashboard layout - the ordered collection of placed widgets
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::color_rules::ColorRule;
use crate::domain::tokens::StyleOverrides;
use crate::domain::widget::{
    DataBinding, GridPosition, GridSize, WidgetConfig, WidgetKind, GRID_COLUMNS,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("widget '{0}' not found")]
    UnknownWidget(String),
    #[error("duplicate widget id '{0}'")]
    DuplicateId(String),
    #[error("invalid widget size {w}x{h}")]
    InvalidSize { w: u32, h: u32 },
}

/// The dashboard composition: an ordered list of widgets with unique ids.
/// Serializes to a single JSON blob in the settings store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
}

impl DashboardLayout {
    /// Starter layout used when nothing is persisted yet or the stored
    /// blob fails to parse.
    pub fn preset_default() -> Self {
        let mut layout = Self::default();
        let presets = [
            (WidgetKind::Stat, GridSize::new(3, 2), "customers_total"),
            (WidgetKind::Stat, GridSize::new(3, 2), "customers_new_today"),
            (WidgetKind::GoalProgress, GridSize::new(3, 2), "goal_progress"),
            (WidgetKind::Stat, GridSize::new(3, 2), "conversion_rate"),
            (WidgetKind::LineChart, GridSize::new(8, 4), "customers_timeline"),
            (WidgetKind::CallbackList, GridSize::new(4, 4), "callbacks_due"),
        ];
        for (kind, size, metric) in presets {
            // Placement over an empty grid cannot fail
            let _ = layout.add_widget(kind, size, DataBinding::metric(metric));
        }
        layout
    }

    pub fn get(&self, id: &str) -> Option<&WidgetConfig> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Add a widget, assigning a fresh id and the first free grid slot.
    ///
    /// Placement is a first-fit top-left scan: rows from the top, columns
    /// left to right, taking the first position where the widget fits
    /// inside the column bound without overlapping an existing widget.
    /// Deterministic for a given layout and size.
    pub fn add_widget(
        &mut self,
        kind: WidgetKind,
        size: GridSize,
        data_binding: DataBinding,
    ) -> Result<&WidgetConfig, LayoutError> {
        Self::check_size(size)?;
        let position = self.first_free_slot(size);
        self.widgets.push(WidgetConfig {
            id: Uuid::new_v4().to_string(),
            kind,
            position,
            size,
            data_binding,
            style_overrides: None,
            color_rules: Vec::new(),
        });
        Ok(self.widgets.last().unwrap())
    }

    pub fn remove_widget(&mut self, id: &str) -> Result<WidgetConfig, LayoutError> {
        let idx = self
            .widgets
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| LayoutError::UnknownWidget(id.to_string()))?;
        Ok(self.widgets.remove(idx))
    }

    /// Update a widget's grid placement. Explicit moves are the user
    /// dragging a widget, so overlap is allowed here; only the column
    /// bound is enforced.
    pub fn move_widget(
        &mut self,
        id: &str,
        position: GridPosition,
        size: GridSize,
    ) -> Result<(), LayoutError> {
        Self::check_size(size)?;
        if position.x + size.w > GRID_COLUMNS {
            return Err(LayoutError::InvalidSize {
                w: size.w,
                h: size.h,
            });
        }
        let widget = self.get_mut(id)?;
        widget.position = position;
        widget.size = size;
        Ok(())
    }

    pub fn set_style_overrides(
        &mut self,
        id: &str,
        overrides: Option<StyleOverrides>,
    ) -> Result<(), LayoutError> {
        self.get_mut(id)?.style_overrides = overrides;
        Ok(())
    }

    pub fn set_color_rules(&mut self, id: &str, rules: Vec<ColorRule>) -> Result<(), LayoutError> {
        self.get_mut(id)?.color_rules = rules;
        Ok(())
    }

    /// Replace the whole composition (preset load). Ids must be unique.
    pub fn replace_all(&mut self, widgets: Vec<WidgetConfig>) -> Result<(), LayoutError> {
        let mut seen = std::collections::HashSet::new();
        for widget in &widgets {
            Self::check_size(widget.size)?;
            if !seen.insert(widget.id.clone()) {
                return Err(LayoutError::DuplicateId(widget.id.clone()));
            }
        }
        self.widgets = widgets;
        Ok(())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut WidgetConfig, LayoutError> {
        self.widgets
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| LayoutError::UnknownWidget(id.to_string()))
    }

    fn check_size(size: GridSize) -> Result<(), LayoutError> {
        if size.w == 0 || size.h == 0 || size.w > GRID_COLUMNS {
            return Err(LayoutError::InvalidSize {
                w: size.w,
                h: size.h,
            });
        }
        Ok(())
    }

    fn first_free_slot(&self, size: GridSize) -> GridPosition {
        // A slot always exists at the row below the current bottom edge,
        // so the scan is bounded.
        let bottom = self
            .widgets
            .iter()
            .map(|w| w.position.y + w.size.h)
            .max()
            .unwrap_or(0);

        for y in 0..=bottom {
            for x in 0..=(GRID_COLUMNS - size.w) {
                let candidate = GridPosition::new(x, y);
                if !self.collides(candidate, size) {
                    return candidate;
                }
            }
        }
        GridPosition::new(0, bottom)
    }

    fn collides(&self, position: GridPosition, size: GridSize) -> bool {
        self.widgets.iter().any(|w| {
            position.x < w.position.x + w.size.w
                && w.position.x < position.x + size.w
                && position.y < w.position.y + w.size.h
                && w.position.y < position.y + size.h
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: &WidgetConfig, b: &WidgetConfig) -> bool {
        a.position.x < b.position.x + b.size.w
            && b.position.x < a.position.x + a.size.w
            && a.position.y < b.position.y + b.size.h
            && b.position.y < a.position.y + a.size.h
    }

    #[test]
    fn first_fit_packs_left_to_right_then_down() {
        let mut layout = DashboardLayout::default();
        let a = layout
            .add_widget(WidgetKind::Stat, GridSize::new(4, 2), DataBinding::metric("m"))
            .unwrap()
            .clone();
        let b = layout
            .add_widget(WidgetKind::Stat, GridSize::new(4, 2), DataBinding::metric("m"))
            .unwrap()
            .clone();
        let c = layout
            .add_widget(WidgetKind::Stat, GridSize::new(6, 2), DataBinding::metric("m"))
            .unwrap()
            .clone();

        assert_eq!(a.position, GridPosition::new(0, 0));
        assert_eq!(b.position, GridPosition::new(4, 0));
        // 6 wide no longer fits on row 0 (only 4 columns left), drops down
        assert_eq!(c.position, GridPosition::new(0, 2));
    }

    #[test]
    fn added_widgets_never_overlap() {
        let mut layout = DashboardLayout::default();
        for i in 0..10 {
            let w = 1 + (i % 5) as u32;
            let h = 1 + (i % 3) as u32;
            layout
                .add_widget(WidgetKind::Stat, GridSize::new(w, h), DataBinding::metric("m"))
                .unwrap();
        }
        for (i, a) in layout.widgets.iter().enumerate() {
            for b in &layout.widgets[i + 1..] {
                assert!(!overlaps(a, b), "{:?} overlaps {:?}", a.id, b.id);
            }
        }
    }

    #[test]
    fn packing_fills_gaps_before_growing_down() {
        let mut layout = DashboardLayout::default();
        layout
            .add_widget(WidgetKind::Stat, GridSize::new(6, 2), DataBinding::metric("m"))
            .unwrap();
        let wide = layout
            .add_widget(WidgetKind::LineChart, GridSize::new(12, 4), DataBinding::metric("m"))
            .unwrap()
            .clone();
        let small = layout
            .add_widget(WidgetKind::Stat, GridSize::new(3, 2), DataBinding::metric("m"))
            .unwrap()
            .clone();

        assert_eq!(wide.position, GridPosition::new(0, 2));
        // The 6x2 widget left a 6-column gap on row 0
        assert_eq!(small.position, GridPosition::new(6, 0));
    }

    #[test]
    fn remove_then_readd_reuses_slot() {
        let mut layout = DashboardLayout::default();
        let first = layout
            .add_widget(WidgetKind::Stat, GridSize::new(3, 2), DataBinding::metric("m"))
            .unwrap()
            .id
            .clone();
        layout
            .add_widget(WidgetKind::Stat, GridSize::new(3, 2), DataBinding::metric("m"))
            .unwrap();
        layout.remove_widget(&first).unwrap();

        let replacement = layout
            .add_widget(WidgetKind::Stat, GridSize::new(3, 2), DataBinding::metric("m"))
            .unwrap();
        assert_eq!(replacement.position, GridPosition::new(0, 0));
    }

    #[test]
    fn oversized_widget_is_rejected() {
        let mut layout = DashboardLayout::default();
        let err = layout
            .add_widget(WidgetKind::Stat, GridSize::new(13, 1), DataBinding::metric("m"))
            .unwrap_err();
        assert_eq!(err, LayoutError::InvalidSize { w: 13, h: 1 });
    }

    #[test]
    fn unknown_widget_operations_fail() {
        let mut layout = DashboardLayout::default();
        assert!(matches!(
            layout.remove_widget("missing"),
            Err(LayoutError::UnknownWidget(_))
        ));
        assert!(matches!(
            layout.set_color_rules("missing", Vec::new()),
            Err(LayoutError::UnknownWidget(_))
        ));
    }

    #[test]
    fn replace_all_rejects_duplicate_ids() {
        let mut layout = DashboardLayout::preset_default();
        let mut widgets = layout.widgets.clone();
        widgets[1].id = widgets[0].id.clone();
        assert!(matches!(
            layout.replace_all(widgets),
            Err(LayoutError::DuplicateId(_))
        ));
    }

    #[test]
    fn layout_round_trips_through_json() {
        let mut layout = DashboardLayout::preset_default();
        layout
            .set_style_overrides(
                &layout.widgets[0].id.clone(),
                Some(StyleOverrides {
                    value_size: Some(crate::domain::tokens::SizeOverride::Px(32)),
                    value_color: Some("#16a34a".to_string()),
                    ..StyleOverrides::default()
                }),
            )
            .unwrap();

        let json = serde_json::to_string(&layout).unwrap();
        let parsed: DashboardLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, layout);
    }
}
