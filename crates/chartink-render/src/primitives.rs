//! Render primitives, one per drawing kind.
//!
//! A primitive is built from a stored drawing's style, receives the
//! drawing's projected geometry and interaction flags each repaint through
//! [`DrawingPrimitive::update_data`], and paints itself onto a [`Painter`].
//! The geometry comes from the same projection used for hit-testing.

use crate::renderer::{OverlayStyle, Painter, TextAlign, TextLabel};
use chartink_core::drawing::{Bracket, Drawing, DrawingShape, DrawingStyle, FibLevel, LineStyle};
use chartink_core::geometry::{DrawingFlags, HitTarget, ProjectedDrawing};
use kurbo::{BezPath, Circle, Point, Rect, Shape, Stroke};
use peniko::Color;

/// Paint routine of one drawing.
pub trait DrawingPrimitive {
    /// Latest geometry and highlight flags.
    fn update_data(&mut self, geometry: ProjectedDrawing, flags: DrawingFlags);

    /// Paint onto `painter`. `pane` is the chart pane in pixels.
    fn paint(&self, painter: &mut dyn Painter, overlay: &OverlayStyle, pane: Rect);
}

/// Primitive for a stored drawing.
pub fn primitive_for(drawing: &Drawing) -> Box<dyn DrawingPrimitive> {
    let style = drawing.style.clone();
    match &drawing.shape {
        DrawingShape::Trendline { .. } => Box::new(TrendlinePrimitive::new(style)),
        DrawingShape::Vertical { .. } => Box::new(VerticalPrimitive::new(style)),
        DrawingShape::HorizontalRay { .. } => Box::new(RayPrimitive::new(style)),
        DrawingShape::FibRetracement {
            levels, show_labels, ..
        } => Box::new(FibPrimitive::new(style, levels.clone(), *show_labels)),
        DrawingShape::Rectangle { .. } => Box::new(RectanglePrimitive::new(style)),
        DrawingShape::LongPosition(b) | DrawingShape::ShortPosition(b) => {
            Box::new(BracketPrimitive::new(b.clone()))
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PrimitiveData {
    geometry: Option<ProjectedDrawing>,
    flags: DrawingFlags,
}

impl PrimitiveData {
    fn update(&mut self, geometry: ProjectedDrawing, flags: DrawingFlags) {
        self.geometry = Some(geometry);
        self.flags = flags;
    }
}

fn segment(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

fn stroke_for(width: f64, line_style: LineStyle) -> Stroke {
    let dashes = line_style.dash_pattern(width);
    if dashes.is_empty() {
        Stroke::new(width)
    } else {
        Stroke::new(width).with_dashes(0.0, dashes)
    }
}

/// Stroke of a drawing's main line, thickened while hovered.
fn line_stroke(style: &DrawingStyle, flags: DrawingFlags, overlay: &OverlayStyle) -> Stroke {
    let boost = if flags.is_hovered { overlay.hover_width_boost } else { 0.0 };
    stroke_for(style.width + boost, style.line_style)
}

/// Handles of a selected or hovered drawing. The hovered or dragged handle
/// is filled with the selection color.
fn paint_handles(
    painter: &mut dyn Painter,
    geometry: &ProjectedDrawing,
    flags: DrawingFlags,
    overlay: &OverlayStyle,
) {
    if !flags.is_selected && !flags.is_hovered {
        return;
    }
    let half = overlay.handle_size / 2.0;
    let border = Stroke::new(1.5);
    for handle in geometry.handles() {
        let active = flags.hovered_part == Some(handle.index)
            || flags.selected_point_index == Some(handle.index);
        let fill = if active { overlay.selection_color } else { Color::WHITE };
        let pos = handle.anchor;
        let path = match handle.target {
            HitTarget::Point(_) => Circle::new(pos, half).to_path(0.1),
            HitTarget::Line(..) | HitTarget::Edge(..) => {
                Rect::new(pos.x - half, pos.y - half, pos.x + half, pos.y + half).to_path(0.1)
            }
        };
        painter.fill(&path, fill);
        painter.stroke(&path, &border, overlay.selection_color);
    }
}

/// Two-point line.
#[derive(Debug, Clone)]
pub struct TrendlinePrimitive {
    style: DrawingStyle,
    data: PrimitiveData,
}

impl TrendlinePrimitive {
    pub fn new(style: DrawingStyle) -> Self {
        Self {
            style,
            data: PrimitiveData::default(),
        }
    }
}

impl DrawingPrimitive for TrendlinePrimitive {
    fn update_data(&mut self, geometry: ProjectedDrawing, flags: DrawingFlags) {
        self.data.update(geometry, flags);
    }

    fn paint(&self, painter: &mut dyn Painter, overlay: &OverlayStyle, _pane: Rect) {
        let Some(geometry @ ProjectedDrawing::Trendline { p0, p1 }) = &self.data.geometry else {
            return;
        };
        let stroke = line_stroke(&self.style, self.data.flags, overlay);
        painter.stroke(&segment(*p0, *p1), &stroke, self.style.stroke());
        paint_handles(painter, geometry, self.data.flags, overlay);
    }
}

/// Full-height vertical line.
#[derive(Debug, Clone)]
pub struct VerticalPrimitive {
    style: DrawingStyle,
    data: PrimitiveData,
}

impl VerticalPrimitive {
    pub fn new(style: DrawingStyle) -> Self {
        Self {
            style,
            data: PrimitiveData::default(),
        }
    }
}

impl DrawingPrimitive for VerticalPrimitive {
    fn update_data(&mut self, geometry: ProjectedDrawing, flags: DrawingFlags) {
        self.data.update(geometry, flags);
    }

    fn paint(&self, painter: &mut dyn Painter, overlay: &OverlayStyle, pane: Rect) {
        let Some(ProjectedDrawing::Vertical { x }) = self.data.geometry else {
            return;
        };
        let stroke = line_stroke(&self.style, self.data.flags, overlay);
        let path = segment(Point::new(x, pane.y0), Point::new(x, pane.y1));
        painter.stroke(&path, &stroke, self.style.stroke());
    }
}

/// Horizontal ray running to the right edge of the pane.
#[derive(Debug, Clone)]
pub struct RayPrimitive {
    style: DrawingStyle,
    data: PrimitiveData,
}

impl RayPrimitive {
    pub fn new(style: DrawingStyle) -> Self {
        Self {
            style,
            data: PrimitiveData::default(),
        }
    }
}

impl DrawingPrimitive for RayPrimitive {
    fn update_data(&mut self, geometry: ProjectedDrawing, flags: DrawingFlags) {
        self.data.update(geometry, flags);
    }

    fn paint(&self, painter: &mut dyn Painter, overlay: &OverlayStyle, pane: Rect) {
        let Some(geometry @ ProjectedDrawing::HorizontalRay { anchor }) = &self.data.geometry else {
            return;
        };
        if anchor.x < pane.x1 {
            let stroke = line_stroke(&self.style, self.data.flags, overlay);
            let path = segment(*anchor, Point::new(pane.x1, anchor.y));
            painter.stroke(&path, &stroke, self.style.stroke());
        }
        paint_handles(painter, geometry, self.data.flags, overlay);
    }
}

/// Retracement levels between two anchors.
#[derive(Debug, Clone)]
pub struct FibPrimitive {
    style: DrawingStyle,
    levels: Vec<FibLevel>,
    show_labels: bool,
    data: PrimitiveData,
}

impl FibPrimitive {
    pub fn new(style: DrawingStyle, levels: Vec<FibLevel>, show_labels: bool) -> Self {
        Self {
            style,
            levels,
            show_labels,
            data: PrimitiveData::default(),
        }
    }
}

impl DrawingPrimitive for FibPrimitive {
    fn update_data(&mut self, geometry: ProjectedDrawing, flags: DrawingFlags) {
        self.data.update(geometry, flags);
    }

    fn paint(&self, painter: &mut dyn Painter, overlay: &OverlayStyle, _pane: Rect) {
        let Some(geometry @ ProjectedDrawing::Fib { p0, p1, levels }) = &self.data.geometry else {
            return;
        };
        let (x0, x1) = (p0.x.min(p1.x), p0.x.max(p1.x));

        if self.style.fill_color.is_some() {
            for pair in levels.windows(2) {
                let Some(level) = self.levels.get(pair[1].index) else {
                    continue;
                };
                let band = Rect::new(x0, pair[0].y, x1, pair[1].y).abs();
                painter.fill(&band.to_path(0.1), level.color.with_alpha(24).into());
            }
        }

        let boost = if self.data.flags.is_hovered { overlay.hover_width_boost } else { 0.0 };
        for projected in levels {
            let Some(level) = self.levels.get(projected.index) else {
                continue;
            };
            let stroke = stroke_for(self.style.width + boost, level.line_style);
            let path = segment(Point::new(x0, projected.y), Point::new(x1, projected.y));
            painter.stroke(&path, &stroke, level.color.into());
            if self.show_labels {
                painter.text(
                    TextLabel::new(
                        format!("{} ({:.2})", level.label, projected.price),
                        Point::new(x0 - 4.0, projected.y),
                        level.color,
                    )
                    .aligned(TextAlign::End),
                );
            }
        }

        let diagonal = stroke_for(1.0, LineStyle::Dashed);
        painter.stroke(&segment(*p0, *p1), &diagonal, self.style.stroke());
        paint_handles(painter, geometry, self.data.flags, overlay);
    }
}

/// Time/price range box.
#[derive(Debug, Clone)]
pub struct RectanglePrimitive {
    style: DrawingStyle,
    data: PrimitiveData,
}

impl RectanglePrimitive {
    pub fn new(style: DrawingStyle) -> Self {
        Self {
            style,
            data: PrimitiveData::default(),
        }
    }
}

impl DrawingPrimitive for RectanglePrimitive {
    fn update_data(&mut self, geometry: ProjectedDrawing, flags: DrawingFlags) {
        self.data.update(geometry, flags);
    }

    fn paint(&self, painter: &mut dyn Painter, overlay: &OverlayStyle, _pane: Rect) {
        let Some(geometry @ ProjectedDrawing::Rectangle { rect }) = &self.data.geometry else {
            return;
        };
        let path = rect.to_path(0.1);
        if let Some(fill) = self.style.fill() {
            painter.fill(&path, fill);
        }
        let stroke = line_stroke(&self.style, self.data.flags, overlay);
        painter.stroke(&path, &stroke, self.style.stroke());
        paint_handles(painter, geometry, self.data.flags, overlay);
    }
}

/// Profit and stop zones of a position bracket.
#[derive(Debug, Clone)]
pub struct BracketPrimitive {
    bracket: Bracket,
    data: PrimitiveData,
}

impl BracketPrimitive {
    pub fn new(bracket: Bracket) -> Self {
        Self {
            bracket,
            data: PrimitiveData::default(),
        }
    }
}

impl DrawingPrimitive for BracketPrimitive {
    fn update_data(&mut self, geometry: ProjectedDrawing, flags: DrawingFlags) {
        self.data.update(geometry, flags);
    }

    fn paint(&self, painter: &mut dyn Painter, overlay: &OverlayStyle, _pane: Rect) {
        let Some(
            geometry @ ProjectedDrawing::Bracket {
                left,
                right,
                entry_y,
                stop_y,
                profit_y,
                ..
            },
        ) = &self.data.geometry
        else {
            return;
        };
        let b = &self.bracket;
        let profit_zone = Rect::new(*left, *entry_y, *right, *profit_y).abs();
        let stop_zone = Rect::new(*left, *entry_y, *right, *stop_y).abs();
        painter.fill(&profit_zone.to_path(0.1), b.profit_color.into());
        painter.fill(&stop_zone.to_path(0.1), b.stop_color.into());

        let boost = if self.data.flags.is_hovered { overlay.hover_width_boost } else { 0.0 };
        let entry = segment(Point::new(*left, *entry_y), Point::new(*right, *entry_y));
        painter.stroke(&entry, &Stroke::new(b.line_width + boost), b.line_color.into());

        painter.text(TextLabel::new(
            format!("Target: {:.2}", b.profit_point.price),
            Point::new(*left + 4.0, *profit_y),
            b.profit_color.with_alpha(255),
        ));
        painter.text(TextLabel::new(
            format!("Stop: {:.2}", b.stop_point.price),
            Point::new(*left + 4.0, *stop_y),
            b.stop_color.with_alpha(255),
        ));
        if let Some(ratio) = b.risk_reward() {
            painter.text(
                TextLabel::new(
                    format!("R:R {ratio:.2}"),
                    Point::new(*right - 4.0, *entry_y),
                    b.line_color,
                )
                .aligned(TextAlign::End),
            );
        }
        paint_handles(painter, geometry, self.data.flags, overlay);
    }
}
