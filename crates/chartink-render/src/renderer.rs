//! Painter abstraction shared by the primitives and the backends.

use chartink_core::SerializableColor;
use kurbo::{BezPath, Point, Stroke};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid overlay style: {0}")]
    InvalidStyle(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Horizontal alignment of a label relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    End,
}

/// A text label for the host's text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    /// Baseline position in pixels.
    pub position: Point,
    pub color: SerializableColor,
    pub align: TextAlign,
}

impl TextLabel {
    pub fn new(text: impl Into<String>, position: Point, color: SerializableColor) -> Self {
        Self {
            text: text.into(),
            position,
            color,
            align: TextAlign::Start,
        }
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// Drawing backend used by the primitives.
///
/// Paths are in pane pixels.
pub trait Painter {
    fn stroke(&mut self, path: &BezPath, stroke: &Stroke, color: Color);

    fn fill(&mut self, path: &BezPath, color: Color);

    fn text(&mut self, label: TextLabel);
}

/// Colors and sizes of interaction highlights.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    /// Handle border and active handle fill.
    pub selection_color: Color,
    /// Handle diameter in pixels.
    pub handle_size: f64,
    /// Extra stroke width of hovered drawings.
    pub hover_width_boost: f64,
    /// Opacity multiplier of drawings being placed.
    pub preview_alpha: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            handle_size: 8.0,
            hover_width_boost: 1.0,
            preview_alpha: 0.6,
        }
    }
}

impl OverlayStyle {
    pub fn validate(&self) -> RenderResult<()> {
        if !self.handle_size.is_finite() || self.handle_size <= 0.0 {
            return Err(RendererError::InvalidStyle(format!(
                "handle size must be positive, got {}",
                self.handle_size
            )));
        }
        if !self.hover_width_boost.is_finite() || self.hover_width_boost < 0.0 {
            return Err(RendererError::InvalidStyle(format!(
                "hover width boost must not be negative, got {}",
                self.hover_width_boost
            )));
        }
        if !(0.0..=1.0).contains(&self.preview_alpha) {
            return Err(RendererError::InvalidStyle(format!(
                "preview alpha must be within 0..=1, got {}",
                self.preview_alpha
            )));
        }
        Ok(())
    }
}
