//! Drawing definitions for chart annotations.

mod bracket;
mod fib;
mod patch;

pub use bracket::{Bracket, PositionSide};
pub use fib::{FibLevel, default_fib_levels};
pub use patch::{DrawingPatch, PatchField};

use crate::chart::Timestamp;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for drawings.
pub type DrawingId = Uuid;

/// A point in domain space: a time on the time axis and a price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawingPoint {
    pub time: Timestamp,
    pub price: f64,
}

impl DrawingPoint {
    pub fn new(time: Timestamp, price: f64) -> Self {
        Self { time, price }
    }
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Default stroke color for new drawings (blue).
pub const DEFAULT_DRAWING_COLOR: SerializableColor = SerializableColor::rgb(41, 98, 255);

/// Stroke pattern for drawing lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Dash pattern in pixels for a stroke of the given width; empty for solid.
    pub fn dash_pattern(self, width: f64) -> Vec<f64> {
        match self {
            LineStyle::Solid => Vec::new(),
            LineStyle::Dashed => vec![6.0 * width.max(1.0), 4.0 * width.max(1.0)],
            LineStyle::Dotted => vec![width.max(1.0), 2.0 * width.max(1.0)],
        }
    }
}

/// Style attributes shared by every drawing kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingStyle {
    pub color: SerializableColor,
    pub width: f64,
    #[serde(default)]
    pub line_style: LineStyle,
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
}

impl Default for DrawingStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_DRAWING_COLOR,
            width: 2.0,
            line_style: LineStyle::Solid,
            fill_color: None,
        }
    }
}

impl DrawingStyle {
    pub fn stroke(&self) -> Color {
        self.color.into()
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(Color::from)
    }
}

/// The kind of a drawing. Also identifies the creation tool for that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawingKind {
    #[serde(rename = "trendline")]
    Trendline,
    #[serde(rename = "vertical")]
    Vertical,
    #[serde(rename = "horizontalRay")]
    HorizontalRay,
    #[serde(rename = "fib-retracement")]
    FibRetracement,
    #[serde(rename = "rectangle")]
    Rectangle,
    #[serde(rename = "long-position")]
    LongPosition,
    #[serde(rename = "short-position")]
    ShortPosition,
}

impl DrawingKind {
    /// Tag used in serialized drawings.
    pub fn tag(self) -> &'static str {
        match self {
            DrawingKind::Trendline => "trendline",
            DrawingKind::Vertical => "vertical",
            DrawingKind::HorizontalRay => "horizontalRay",
            DrawingKind::FibRetracement => "fib-retracement",
            DrawingKind::Rectangle => "rectangle",
            DrawingKind::LongPosition => "long-position",
            DrawingKind::ShortPosition => "short-position",
        }
    }

    /// Kinds placed with two anchors (two clicks or a click-drag).
    pub fn is_two_point(self) -> bool {
        matches!(
            self,
            DrawingKind::Trendline | DrawingKind::FibRetracement | DrawingKind::Rectangle
        )
    }

    pub fn is_bracket(self) -> bool {
        matches!(self, DrawingKind::LongPosition | DrawingKind::ShortPosition)
    }

    pub fn all() -> &'static [DrawingKind] {
        &[
            DrawingKind::Trendline,
            DrawingKind::Vertical,
            DrawingKind::HorizontalRay,
            DrawingKind::FibRetracement,
            DrawingKind::Rectangle,
            DrawingKind::LongPosition,
            DrawingKind::ShortPosition,
        ]
    }
}

/// Kind-specific geometry of a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrawingShape {
    #[serde(rename = "trendline")]
    Trendline { points: [DrawingPoint; 2] },
    #[serde(rename = "vertical")]
    Vertical { time: Timestamp },
    #[serde(rename = "horizontalRay")]
    HorizontalRay { anchor: DrawingPoint },
    #[serde(rename = "fib-retracement")]
    FibRetracement {
        points: [DrawingPoint; 2],
        levels: Vec<FibLevel>,
        #[serde(rename = "showLabels", default = "default_show_labels")]
        show_labels: bool,
    },
    #[serde(rename = "rectangle")]
    Rectangle { points: [DrawingPoint; 2] },
    #[serde(rename = "long-position")]
    LongPosition(Bracket),
    #[serde(rename = "short-position")]
    ShortPosition(Bracket),
}

fn default_show_labels() -> bool {
    true
}

impl DrawingShape {
    pub fn kind(&self) -> DrawingKind {
        match self {
            DrawingShape::Trendline { .. } => DrawingKind::Trendline,
            DrawingShape::Vertical { .. } => DrawingKind::Vertical,
            DrawingShape::HorizontalRay { .. } => DrawingKind::HorizontalRay,
            DrawingShape::FibRetracement { .. } => DrawingKind::FibRetracement,
            DrawingShape::Rectangle { .. } => DrawingKind::Rectangle,
            DrawingShape::LongPosition(_) => DrawingKind::LongPosition,
            DrawingShape::ShortPosition(_) => DrawingKind::ShortPosition,
        }
    }

    /// Bracket geometry and its side, for the two position kinds.
    pub fn bracket(&self) -> Option<(&Bracket, PositionSide)> {
        match self {
            DrawingShape::LongPosition(b) => Some((b, PositionSide::Long)),
            DrawingShape::ShortPosition(b) => Some((b, PositionSide::Short)),
            _ => None,
        }
    }

    pub fn bracket_mut(&mut self) -> Option<(&mut Bracket, PositionSide)> {
        match self {
            DrawingShape::LongPosition(b) => Some((b, PositionSide::Long)),
            DrawingShape::ShortPosition(b) => Some((b, PositionSide::Short)),
            _ => None,
        }
    }

    /// Both anchors of a two-point shape.
    pub fn two_points(&self) -> Option<[DrawingPoint; 2]> {
        match self {
            DrawingShape::Trendline { points }
            | DrawingShape::FibRetracement { points, .. }
            | DrawingShape::Rectangle { points } => Some(*points),
            _ => None,
        }
    }

    pub fn two_points_mut(&mut self) -> Option<&mut [DrawingPoint; 2]> {
        match self {
            DrawingShape::Trendline { points }
            | DrawingShape::FibRetracement { points, .. }
            | DrawingShape::Rectangle { points } => Some(points),
            _ => None,
        }
    }

    /// Visit every stored time of the shape.
    pub fn for_each_time_mut(&mut self, mut f: impl FnMut(&mut Timestamp)) {
        match self {
            DrawingShape::Trendline { points }
            | DrawingShape::FibRetracement { points, .. }
            | DrawingShape::Rectangle { points } => {
                for p in points.iter_mut() {
                    f(&mut p.time);
                }
            }
            DrawingShape::Vertical { time } => f(time),
            DrawingShape::HorizontalRay { anchor } => f(&mut anchor.time),
            DrawingShape::LongPosition(b) | DrawingShape::ShortPosition(b) => {
                f(&mut b.entry_point.time);
                f(&mut b.stop_point.time);
                f(&mut b.profit_point.time);
                if let Some(end) = b.end_point.as_mut() {
                    f(&mut end.time);
                }
            }
        }
    }
}

/// A persisted drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub(crate) id: DrawingId,
    pub style: DrawingStyle,
    /// Display timezone active when the drawing was created or last shifted.
    pub timezone: String,
    #[serde(flatten)]
    pub shape: DrawingShape,
}

impl Drawing {
    /// Create a drawing with a fresh id.
    pub fn new(shape: DrawingShape, style: DrawingStyle, timezone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            style,
            timezone: timezone.into(),
            shape,
        }
    }

    pub fn id(&self) -> DrawingId {
        self.id
    }

    pub fn kind(&self) -> DrawingKind {
        self.shape.kind()
    }
}
