//! Partial updates with a per-kind field whitelist.

use super::{
    Drawing, DrawingKind, DrawingPoint, DrawingShape, FibLevel, LineStyle, SerializableColor,
};
use crate::chart::Timestamp;
use serde::{Deserialize, Serialize};

/// Names of the fields a patch may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchField {
    Points,
    Time,
    Anchor,
    EntryPoint,
    StopPoint,
    ProfitPoint,
    EndPoint,
    Color,
    Width,
    LineStyle,
    FillColor,
    Levels,
    ShowLabels,
    ProfitColor,
    StopColor,
    LineColor,
    LineWidth,
}

impl PatchField {
    /// Whether this field exists on drawings of `kind`.
    pub fn valid_for(self, kind: DrawingKind) -> bool {
        use DrawingKind as K;
        match self {
            PatchField::Color | PatchField::Width | PatchField::LineStyle => true,
            PatchField::Points => kind.is_two_point(),
            PatchField::Time => kind == K::Vertical,
            PatchField::Anchor => kind == K::HorizontalRay,
            PatchField::FillColor => matches!(kind, K::Rectangle | K::FibRetracement),
            PatchField::Levels | PatchField::ShowLabels => kind == K::FibRetracement,
            PatchField::EntryPoint
            | PatchField::StopPoint
            | PatchField::ProfitPoint
            | PatchField::EndPoint
            | PatchField::ProfitColor
            | PatchField::StopColor
            | PatchField::LineColor
            | PatchField::LineWidth => kind.is_bracket(),
        }
    }

    /// Style fields feed the per-kind defaults; geometry fields do not.
    pub fn is_style(self) -> bool {
        !matches!(
            self,
            PatchField::Points
                | PatchField::Time
                | PatchField::Anchor
                | PatchField::EntryPoint
                | PatchField::StopPoint
                | PatchField::ProfitPoint
                | PatchField::EndPoint
        )
    }
}

/// A partial drawing update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawingPatch {
    pub points: Option<[DrawingPoint; 2]>,
    pub time: Option<Timestamp>,
    pub anchor: Option<DrawingPoint>,
    pub entry_point: Option<DrawingPoint>,
    pub stop_point: Option<DrawingPoint>,
    pub profit_point: Option<DrawingPoint>,
    pub end_point: Option<DrawingPoint>,
    pub color: Option<SerializableColor>,
    pub width: Option<f64>,
    pub line_style: Option<LineStyle>,
    pub fill_color: Option<Option<SerializableColor>>,
    pub levels: Option<Vec<FibLevel>>,
    pub show_labels: Option<bool>,
    pub profit_color: Option<SerializableColor>,
    pub stop_color: Option<SerializableColor>,
    pub line_color: Option<SerializableColor>,
    pub line_width: Option<f64>,
}

fn finite_point(p: &DrawingPoint) -> bool {
    p.price.is_finite()
}

fn positive_width(w: f64) -> bool {
    w.is_finite() && w > 0.0
}

impl DrawingPatch {
    /// Patch carrying the complete geometry of `drawing`.
    pub fn geometry_of(drawing: &Drawing) -> Self {
        let mut patch = Self::default();
        match &drawing.shape {
            DrawingShape::Trendline { points }
            | DrawingShape::FibRetracement { points, .. }
            | DrawingShape::Rectangle { points } => patch.points = Some(*points),
            DrawingShape::Vertical { time } => patch.time = Some(*time),
            DrawingShape::HorizontalRay { anchor } => patch.anchor = Some(*anchor),
            DrawingShape::LongPosition(b) | DrawingShape::ShortPosition(b) => {
                patch.entry_point = Some(b.entry_point);
                patch.stop_point = Some(b.stop_point);
                patch.profit_point = Some(b.profit_point);
                patch.end_point = b.end_point;
            }
        }
        patch
    }

    /// Patch carrying the complete style of `drawing`.
    pub fn style_of(drawing: &Drawing) -> Self {
        let mut patch = Self {
            color: Some(drawing.style.color),
            width: Some(drawing.style.width),
            line_style: Some(drawing.style.line_style),
            ..Self::default()
        };
        match &drawing.shape {
            DrawingShape::Rectangle { .. } => patch.fill_color = Some(drawing.style.fill_color),
            DrawingShape::FibRetracement {
                levels, show_labels, ..
            } => {
                patch.fill_color = Some(drawing.style.fill_color);
                patch.levels = Some(levels.clone());
                patch.show_labels = Some(*show_labels);
            }
            DrawingShape::LongPosition(b) | DrawingShape::ShortPosition(b) => {
                patch.profit_color = Some(b.profit_color);
                patch.stop_color = Some(b.stop_color);
                patch.line_color = Some(b.line_color);
                patch.line_width = Some(b.line_width);
            }
            DrawingShape::Trendline { .. }
            | DrawingShape::Vertical { .. }
            | DrawingShape::HorizontalRay { .. } => {}
        }
        patch
    }

    /// Fields present in this patch, in application order.
    pub fn present_fields(&self) -> Vec<PatchField> {
        let flags = [
            (self.points.is_some(), PatchField::Points),
            (self.time.is_some(), PatchField::Time),
            (self.anchor.is_some(), PatchField::Anchor),
            (self.entry_point.is_some(), PatchField::EntryPoint),
            (self.stop_point.is_some(), PatchField::StopPoint),
            (self.profit_point.is_some(), PatchField::ProfitPoint),
            (self.end_point.is_some(), PatchField::EndPoint),
            (self.color.is_some(), PatchField::Color),
            (self.width.is_some(), PatchField::Width),
            (self.line_style.is_some(), PatchField::LineStyle),
            (self.fill_color.is_some(), PatchField::FillColor),
            (self.levels.is_some(), PatchField::Levels),
            (self.show_labels.is_some(), PatchField::ShowLabels),
            (self.profit_color.is_some(), PatchField::ProfitColor),
            (self.stop_color.is_some(), PatchField::StopColor),
            (self.line_color.is_some(), PatchField::LineColor),
            (self.line_width.is_some(), PatchField::LineWidth),
        ];
        flags
            .into_iter()
            .filter_map(|(present, field)| present.then_some(field))
            .collect()
    }

    /// Whether the value carried for `field` is usable.
    fn value_ok(&self, field: PatchField) -> bool {
        match field {
            PatchField::Points => self.points.is_some_and(|pts| pts.iter().all(finite_point)),
            PatchField::Anchor => self.anchor.as_ref().is_some_and(finite_point),
            PatchField::EntryPoint => self.entry_point.as_ref().is_some_and(finite_point),
            PatchField::StopPoint => self.stop_point.as_ref().is_some_and(finite_point),
            PatchField::ProfitPoint => self.profit_point.as_ref().is_some_and(finite_point),
            PatchField::EndPoint => self.end_point.as_ref().is_some_and(finite_point),
            PatchField::Width => self.width.is_some_and(positive_width),
            PatchField::LineWidth => self.line_width.is_some_and(positive_width),
            PatchField::Levels => self
                .levels
                .as_ref()
                .is_some_and(|levels| levels.iter().all(FibLevel::is_valid)),
            _ => true,
        }
    }

    /// Copy of this patch reduced to style fields.
    pub fn style_only(&self) -> Self {
        Self {
            color: self.color,
            width: self.width,
            line_style: self.line_style,
            fill_color: self.fill_color,
            levels: self.levels.clone(),
            show_labels: self.show_labels,
            profit_color: self.profit_color,
            stop_color: self.stop_color,
            line_color: self.line_color,
            line_width: self.line_width,
            ..Self::default()
        }
    }

    /// Overlay the fields present in `other` onto this patch.
    pub fn merge(&mut self, other: &DrawingPatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field.clone(); })*
            };
        }
        take!(
            points, time, anchor, entry_point, stop_point, profit_point, end_point, color, width,
            line_style, fill_color, levels, show_labels, profit_color, stop_color, line_color,
            line_width
        );
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// Apply the fields valid for the drawing's kind, dropping the rest.
    ///
    /// Returns the fields that were applied.
    pub fn apply_to(&self, drawing: &mut Drawing) -> Vec<PatchField> {
        let kind = drawing.kind();
        let mut applied = Vec::new();
        for field in self.present_fields() {
            if !field.valid_for(kind) {
                log::debug!("Dropping {:?} from patch for {} drawing", field, kind.tag());
                continue;
            }
            if !self.value_ok(field) {
                log::debug!("Dropping invalid {:?} value for {} drawing", field, kind.tag());
                continue;
            }
            self.apply_field(field, drawing);
            applied.push(field);
        }
        applied
    }

    fn apply_field(&self, field: PatchField, drawing: &mut Drawing) {
        let style = &mut drawing.style;
        match field {
            PatchField::Color => style.color = self.color.unwrap_or(style.color),
            PatchField::Width => style.width = self.width.unwrap_or(style.width),
            PatchField::LineStyle => style.line_style = self.line_style.unwrap_or(style.line_style),
            PatchField::FillColor => style.fill_color = self.fill_color.unwrap_or(style.fill_color),
            _ => {}
        }

        match &mut drawing.shape {
            DrawingShape::Trendline { points } | DrawingShape::Rectangle { points } => {
                if let (PatchField::Points, Some(new)) = (field, self.points) {
                    *points = new;
                }
            }
            DrawingShape::FibRetracement {
                points,
                levels,
                show_labels,
            } => match field {
                PatchField::Points => *points = self.points.unwrap_or(*points),
                PatchField::Levels => {
                    if let Some(new) = &self.levels {
                        *levels = new.clone();
                    }
                }
                PatchField::ShowLabels => *show_labels = self.show_labels.unwrap_or(*show_labels),
                _ => {}
            },
            DrawingShape::Vertical { time } => {
                if let (PatchField::Time, Some(new)) = (field, self.time) {
                    *time = new;
                }
            }
            DrawingShape::HorizontalRay { anchor } => {
                if let (PatchField::Anchor, Some(new)) = (field, self.anchor) {
                    *anchor = new;
                }
            }
            DrawingShape::LongPosition(b) | DrawingShape::ShortPosition(b) => match field {
                PatchField::EntryPoint => b.entry_point = self.entry_point.unwrap_or(b.entry_point),
                PatchField::StopPoint => b.stop_point = self.stop_point.unwrap_or(b.stop_point),
                PatchField::ProfitPoint => {
                    b.profit_point = self.profit_point.unwrap_or(b.profit_point)
                }
                PatchField::EndPoint => b.end_point = self.end_point.or(b.end_point),
                PatchField::ProfitColor => {
                    b.profit_color = self.profit_color.unwrap_or(b.profit_color)
                }
                PatchField::StopColor => b.stop_color = self.stop_color.unwrap_or(b.stop_color),
                PatchField::LineColor => b.line_color = self.line_color.unwrap_or(b.line_color),
                PatchField::LineWidth => b.line_width = self.line_width.unwrap_or(b.line_width),
                _ => {}
            },
        }
    }
}
