//! Drawing store: drawings, selection, active tool and per-kind defaults.

use crate::drawing::{
    Drawing, DrawingId, DrawingKind, DrawingPatch, DrawingShape, DrawingStyle, PatchField,
};
use crate::error::ChartInkResult;
use crate::timezone::{parse_timezone, shift_drawing};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_timezone() -> String {
    "UTC".to_string()
}

/// The drawing slice of the application state.
///
/// Selection and the active tool are mutually exclusive: arming a tool
/// clears the selection and selecting a drawing disarms the tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingStore {
    /// Drawings in creation order (back to front).
    drawings: Vec<Drawing>,
    #[serde(skip)]
    selected_drawing_id: Option<DrawingId>,
    #[serde(skip)]
    active_tool: Option<DrawingKind>,
    /// Style fields of the last edit per kind, applied to new drawings.
    #[serde(default)]
    defaults: HashMap<DrawingKind, DrawingPatch>,
    /// Display timezone of new drawings.
    #[serde(default = "default_timezone")]
    timezone: String,
}

impl Default for DrawingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingStore {
    pub fn new() -> Self {
        Self::with_timezone(default_timezone())
    }

    /// Empty store whose new drawings are tagged with `timezone`.
    pub fn with_timezone(timezone: impl Into<String>) -> Self {
        Self {
            drawings: Vec::new(),
            selected_drawing_id: None,
            active_tool: None,
            defaults: HashMap::new(),
            timezone: timezone.into(),
        }
    }

    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    pub fn get(&self, id: DrawingId) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id() == id)
    }

    fn get_mut(&mut self, id: DrawingId) -> Option<&mut Drawing> {
        self.drawings.iter_mut().find(|d| d.id() == id)
    }

    /// A drawing for `shape`, styled from the kind's defaults. Not yet stored.
    pub fn new_drawing(&self, shape: DrawingShape) -> Drawing {
        let mut drawing = Drawing::new(shape, DrawingStyle::default(), self.timezone.clone());
        if let Some(defaults) = self.defaults.get(&drawing.kind()) {
            defaults.apply_to(&mut drawing);
        }
        drawing
    }

    /// Store a drawing on top of the others.
    pub fn add_drawing(&mut self, drawing: Drawing) -> DrawingId {
        let id = drawing.id();
        if let Some(existing) = self.get_mut(id) {
            *existing = drawing;
        } else {
            self.drawings.push(drawing);
        }
        id
    }

    /// Apply a partial update, dropping fields the kind does not have.
    ///
    /// Returns the applied fields. Style edits also become the kind's
    /// defaults for new drawings.
    pub fn update_drawing(&mut self, id: DrawingId, patch: &DrawingPatch) -> Vec<PatchField> {
        let Some(drawing) = self.get_mut(id) else {
            log::debug!("Ignoring update of missing drawing {}", id);
            return Vec::new();
        };
        let kind = drawing.kind();
        let applied = patch.apply_to(drawing);
        if applied.iter().any(|f| f.is_style()) {
            self.defaults.entry(kind).or_default().merge(&patch.style_only());
        }
        applied
    }

    /// Replace a stored drawing wholesale, matching on id.
    pub fn replace_drawing(&mut self, drawing: Drawing) -> bool {
        match self.get_mut(drawing.id()) {
            Some(existing) => {
                *existing = drawing;
                true
            }
            None => false,
        }
    }

    pub fn remove_drawing(&mut self, id: DrawingId) -> Option<Drawing> {
        let index = self.drawings.iter().position(|d| d.id() == id)?;
        if self.selected_drawing_id == Some(id) {
            self.selected_drawing_id = None;
        }
        Some(self.drawings.remove(index))
    }

    /// Remove every drawing and clear the selection.
    pub fn clear_all(&mut self) {
        self.drawings.clear();
        self.selected_drawing_id = None;
    }

    /// Selected id, `None` when nothing or a missing drawing is selected.
    pub fn selected_drawing_id(&self) -> Option<DrawingId> {
        self.selected_drawing().map(Drawing::id)
    }

    pub fn selected_drawing(&self) -> Option<&Drawing> {
        self.selected_drawing_id.and_then(|id| self.get(id))
    }

    /// Select a drawing. Selecting disarms the active tool.
    pub fn set_selected_drawing_id(&mut self, id: Option<DrawingId>) {
        if id.is_some() {
            self.active_tool = None;
        }
        self.selected_drawing_id = id;
    }

    pub fn active_tool(&self) -> Option<DrawingKind> {
        self.active_tool
    }

    /// Arm a creation tool. Arming clears the selection.
    pub fn set_active_tool(&mut self, tool: Option<DrawingKind>) {
        if tool.is_some() {
            self.selected_drawing_id = None;
        }
        self.active_tool = tool;
    }

    pub fn defaults(&self, kind: DrawingKind) -> Option<&DrawingPatch> {
        self.defaults.get(&kind)
    }

    /// Replace the defaults of a kind. Geometry fields are ignored.
    pub fn set_defaults(&mut self, kind: DrawingKind, patch: &DrawingPatch) {
        self.defaults.insert(kind, patch.style_only());
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Switch the display timezone, shifting every stored time.
    ///
    /// Drawings tagged with an unknown timezone are left as they are.
    pub fn set_timezone(&mut self, name: &str) -> ChartInkResult<()> {
        let tz = parse_timezone(name)?;
        let shifted = self
            .drawings
            .iter_mut()
            .filter(|d| d.timezone != name)
            .map(|d| shift_drawing(d, name, tz))
            .filter(|ok| *ok)
            .count();
        log::debug!(
            "Switched timezone {} -> {}, shifted {} drawings",
            self.timezone,
            name,
            shifted
        );
        self.timezone = name.to_string();
        Ok(())
    }

    /// Serialize drawings, defaults and timezone to JSON.
    pub fn to_json(&self) -> ChartInkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a snapshot written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> ChartInkResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            log::warn!("Failed to load drawing snapshot: {}", err);
            err.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{DrawingPoint, LineStyle, SerializableColor};
    use crate::error::ChartInkError;

    fn trendline(store: &DrawingStore) -> Drawing {
        store.new_drawing(DrawingShape::Trendline {
            points: [DrawingPoint::new(1_000, 100.0), DrawingPoint::new(2_000, 120.0)],
        })
    }

    #[test]
    fn test_selection_and_tool_are_exclusive() {
        let mut store = DrawingStore::new();
        let id = store.add_drawing(trendline(&store));

        store.set_selected_drawing_id(Some(id));
        store.set_active_tool(Some(DrawingKind::Rectangle));
        assert_eq!(store.selected_drawing_id(), None);

        store.set_selected_drawing_id(Some(id));
        assert_eq!(store.active_tool(), None);
        assert_eq!(store.selected_drawing_id(), Some(id));
    }

    #[test]
    fn test_missing_selection_reads_as_none() {
        let mut store = DrawingStore::new();
        store.set_selected_drawing_id(Some(uuid::Uuid::new_v4()));
        assert!(store.selected_drawing().is_none());
        assert_eq!(store.selected_drawing_id(), None);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut store = DrawingStore::new();
        let id = store.add_drawing(trendline(&store));
        store.set_selected_drawing_id(Some(id));
        assert!(store.remove_drawing(id).is_some());
        assert!(store.is_empty());
        assert!(store.selected_drawing().is_none());
        assert!(store.remove_drawing(id).is_none());
    }

    #[test]
    fn test_update_whitelist() {
        let mut store = DrawingStore::new();
        let id = store.add_drawing(trendline(&store));
        let patch = DrawingPatch {
            time: Some(5),
            show_labels: Some(false),
            width: Some(3.0),
            ..DrawingPatch::default()
        };
        assert_eq!(store.update_drawing(id, &patch), vec![PatchField::Width]);
        assert!((store.get(id).unwrap().style.width - 3.0).abs() < f64::EPSILON);
        assert!(store.update_drawing(uuid::Uuid::new_v4(), &patch).is_empty());
    }

    #[test]
    fn test_last_edit_wins_defaults() {
        let mut store = DrawingStore::new();
        let first = store.add_drawing(trendline(&store));
        let second = store.add_drawing(trendline(&store));

        let red = SerializableColor::rgb(255, 0, 0);
        let blue = SerializableColor::rgb(0, 0, 255);
        store.update_drawing(
            first,
            &DrawingPatch {
                color: Some(red),
                line_style: Some(LineStyle::Dashed),
                ..DrawingPatch::default()
            },
        );
        store.update_drawing(
            second,
            &DrawingPatch {
                color: Some(blue),
                ..DrawingPatch::default()
            },
        );

        let fresh = trendline(&store);
        assert_eq!(fresh.style.color, blue);
        assert_eq!(fresh.style.line_style, LineStyle::Dashed);

        // Defaults are per kind.
        let line = store.new_drawing(DrawingShape::Vertical { time: 0 });
        assert_eq!(line.style, DrawingStyle::default());
    }

    #[test]
    fn test_geometry_edits_leave_defaults_alone() {
        let mut store = DrawingStore::new();
        let drawing = trendline(&store);
        let id = store.add_drawing(drawing.clone());
        store.update_drawing(id, &DrawingPatch::geometry_of(&drawing));
        assert!(store.defaults(DrawingKind::Trendline).is_none());
    }

    #[test]
    fn test_replace_drawing() {
        let mut store = DrawingStore::new();
        let mut drawing = trendline(&store);
        let id = store.add_drawing(drawing.clone());
        drawing.style.width = 7.0;
        assert!(store.replace_drawing(drawing.clone()));
        assert_eq!(store.get(id), Some(&drawing));
        assert!(!store.replace_drawing(trendline(&store)));
    }

    #[test]
    fn test_timezone_switch_round_trip() {
        let mut store = DrawingStore::new();
        let id = store.add_drawing(trendline(&store));
        let before = store.get(id).unwrap().shape.clone();

        store.set_timezone("Asia/Kolkata").unwrap();
        let [a, _] = store.get(id).unwrap().shape.two_points().unwrap();
        assert_eq!(a.time, 1_000 + 19_800);
        assert_eq!(store.get(id).unwrap().timezone, "Asia/Kolkata");
        assert_eq!(trendline(&store).timezone, "Asia/Kolkata");

        store.set_timezone("UTC").unwrap();
        let after = store.get(id).unwrap().shape.two_points().unwrap();
        let original = before.two_points().unwrap();
        for (x, y) in after.iter().zip(&original) {
            assert!((x.time - y.time).abs() <= 1);
        }
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let mut store = DrawingStore::new();
        store.add_drawing(trendline(&store));
        assert!(matches!(
            store.set_timezone("Atlantis/Capital"),
            Err(ChartInkError::UnknownTimezone(_))
        ));
        assert_eq!(store.timezone(), "UTC");
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = DrawingStore::new();
        let id = store.add_drawing(trendline(&store));
        store.set_defaults(
            DrawingKind::Rectangle,
            &DrawingPatch {
                fill_color: Some(Some(SerializableColor::rgb(1, 2, 3))),
                ..DrawingPatch::default()
            },
        );
        store.set_selected_drawing_id(Some(id));

        let json = store.to_json().unwrap();
        let loaded = DrawingStore::from_json(&json).unwrap();
        assert_eq!(loaded.drawings(), store.drawings());
        assert_eq!(loaded.defaults(DrawingKind::Rectangle), store.defaults(DrawingKind::Rectangle));
        assert_eq!(loaded.selected_drawing_id(), None);
        assert!(matches!(
            DrawingStore::from_json("{ not json"),
            Err(ChartInkError::Serialization(_))
        ));
    }

    #[test]
    fn test_clear_all() {
        let mut store = DrawingStore::new();
        let id = store.add_drawing(trendline(&store));
        store.set_selected_drawing_id(Some(id));
        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.selected_drawing_id(), None);
    }
}
