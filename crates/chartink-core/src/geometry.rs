//! Screen-space geometry of drawings.
//!
//! [`project`] turns a stored drawing into pixels through the coordinate
//! bridge. The result feeds both the render primitives and hit-testing, so
//! a handle is hit exactly where it is painted.

use crate::bridge::CoordinateBridge;
use crate::config::InteractionConfig;
use crate::drawing::{Drawing, DrawingShape, PositionSide};
use kurbo::{Point, Rect, Vec2};

/// Corner positions of a rectangle. Handle indices 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn handle_index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }

    pub fn from_handle(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn position(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// Edge positions of a rectangle. Handle indices 4..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    pub fn handle_index(self) -> usize {
        match self {
            Edge::Top => 4,
            Edge::Right => 5,
            Edge::Bottom => 6,
            Edge::Left => 7,
        }
    }

    pub fn from_handle(index: usize) -> Option<Self> {
        index.checked_sub(4).and_then(|i| Self::ALL.get(i).copied())
    }

    /// End points of this edge on `rect`.
    pub fn segment(self, rect: Rect) -> (Point, Point) {
        match self {
            Edge::Top => (Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y0)),
            Edge::Right => (Point::new(rect.x1, rect.y0), Point::new(rect.x1, rect.y1)),
            Edge::Bottom => (Point::new(rect.x0, rect.y1), Point::new(rect.x1, rect.y1)),
            Edge::Left => (Point::new(rect.x0, rect.y0), Point::new(rect.x0, rect.y1)),
        }
    }
}

/// Bracket handle indices.
pub const BRACKET_ENTRY_LINE: usize = 0;
pub const BRACKET_STOP_LINE: usize = 1;
pub const BRACKET_PROFIT_LINE: usize = 2;
pub const BRACKET_RIGHT_EDGE: usize = 3;

/// One retracement level in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedLevel {
    /// Index into the drawing's level list.
    pub index: usize,
    pub price: f64,
    pub y: f64,
}

/// A drawing projected to screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedDrawing {
    Trendline {
        p0: Point,
        p1: Point,
    },
    Vertical {
        x: f64,
    },
    HorizontalRay {
        anchor: Point,
    },
    Fib {
        p0: Point,
        p1: Point,
        levels: Vec<ProjectedLevel>,
    },
    Rectangle {
        rect: Rect,
    },
    Bracket {
        side: PositionSide,
        left: f64,
        right: f64,
        entry_y: f64,
        stop_y: f64,
        profit_y: f64,
    },
}

/// Project a drawing to pixels. `None` when any of its anchors cannot be placed.
pub fn project(drawing: &Drawing, bridge: &CoordinateBridge<'_>) -> Option<ProjectedDrawing> {
    let projected = match &drawing.shape {
        DrawingShape::Trendline { points } => ProjectedDrawing::Trendline {
            p0: bridge.domain_to_pixel(points[0])?,
            p1: bridge.domain_to_pixel(points[1])?,
        },
        DrawingShape::Vertical { time } => ProjectedDrawing::Vertical {
            x: bridge.time_to_x(*time)?,
        },
        DrawingShape::HorizontalRay { anchor } => ProjectedDrawing::HorizontalRay {
            anchor: bridge.domain_to_pixel(*anchor)?,
        },
        DrawingShape::FibRetracement { points, levels, .. } => {
            let (start, end) = (points[0].price, points[1].price);
            let levels = levels
                .iter()
                .enumerate()
                .map(|(index, level)| {
                    let price = level.price(start, end);
                    Some(ProjectedLevel {
                        index,
                        price,
                        y: bridge.price_to_y(price)?,
                    })
                })
                .collect::<Option<Vec<_>>>()?;
            ProjectedDrawing::Fib {
                p0: bridge.domain_to_pixel(points[0])?,
                p1: bridge.domain_to_pixel(points[1])?,
                levels,
            }
        }
        DrawingShape::Rectangle { points } => ProjectedDrawing::Rectangle {
            rect: Rect::from_points(
                bridge.domain_to_pixel(points[0])?,
                bridge.domain_to_pixel(points[1])?,
            ),
        },
        DrawingShape::LongPosition(_) | DrawingShape::ShortPosition(_) => {
            let (b, side) = drawing.shape.bracket()?;
            ProjectedDrawing::Bracket {
                side,
                left: bridge.time_to_x(b.entry_point.time)?,
                right: bridge.time_to_x(b.right_time())?,
                entry_y: bridge.price_to_y(b.entry_point.price)?,
                stop_y: bridge.price_to_y(b.stop_point.price)?,
                profit_y: bridge.price_to_y(b.profit_point.price)?,
            }
        }
    };
    Some(projected)
}

/// What a handle is hit-tested against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    /// A point handle, tested against the handle tolerance.
    Point(Point),
    /// A line handle, tested against the line tolerance.
    Line(Point, Point),
    /// An area edge, tested against the edge tolerance.
    Edge(Point, Point),
}

/// A draggable part of a projected drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub index: usize,
    pub target: HitTarget,
    /// Where the handle is painted.
    pub anchor: Point,
}

impl Handle {
    fn point(index: usize, position: Point) -> Self {
        Self {
            index,
            target: HitTarget::Point(position),
            anchor: position,
        }
    }

    fn line(index: usize, a: Point, b: Point) -> Self {
        Self {
            index,
            target: HitTarget::Line(a, b),
            anchor: a.midpoint(b),
        }
    }

    fn edge(index: usize, a: Point, b: Point) -> Self {
        Self {
            index,
            target: HitTarget::Edge(a, b),
            anchor: a.midpoint(b),
        }
    }
}

/// Which part of a drawing the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Handle(usize),
    /// The whole shape.
    Body,
}

impl HitPart {
    pub fn handle_index(self) -> Option<usize> {
        match self {
            HitPart::Handle(index) => Some(index),
            HitPart::Body => None,
        }
    }
}

impl ProjectedDrawing {
    /// Handles in index order.
    pub fn handles(&self) -> Vec<Handle> {
        match self {
            ProjectedDrawing::Trendline { p0, p1 } | ProjectedDrawing::Fib { p0, p1, .. } => {
                vec![Handle::point(0, *p0), Handle::point(1, *p1)]
            }
            ProjectedDrawing::HorizontalRay { anchor } => vec![Handle::point(0, *anchor)],
            ProjectedDrawing::Vertical { .. } => Vec::new(),
            ProjectedDrawing::Rectangle { rect } => {
                let mut handles: Vec<Handle> = Corner::ALL
                    .iter()
                    .map(|c| Handle::point(c.handle_index(), c.position(*rect)))
                    .collect();
                handles.extend(Edge::ALL.iter().map(|e| {
                    let (a, b) = e.segment(*rect);
                    Handle::edge(e.handle_index(), a, b)
                }));
                handles
            }
            ProjectedDrawing::Bracket {
                left,
                right,
                entry_y,
                stop_y,
                profit_y,
                ..
            } => {
                let line = |index, y: f64| {
                    Handle::line(index, Point::new(*left, y), Point::new(*right, y))
                };
                let (top, bottom) = (stop_y.min(*profit_y), stop_y.max(*profit_y));
                let mut right_edge = Handle::edge(
                    BRACKET_RIGHT_EDGE,
                    Point::new(*right, top),
                    Point::new(*right, bottom),
                );
                // Painted inside the profit zone, clear of the entry line.
                right_edge.anchor = Point::new(*right, (entry_y + profit_y) / 2.0);
                vec![
                    line(BRACKET_ENTRY_LINE, *entry_y),
                    line(BRACKET_STOP_LINE, *stop_y),
                    line(BRACKET_PROFIT_LINE, *profit_y),
                    right_edge,
                ]
            }
        }
    }

    /// Painted position of handle `index`.
    pub fn handle_pixel(&self, index: usize) -> Option<Point> {
        self.handles()
            .into_iter()
            .find(|h| h.index == index)
            .map(|h| h.anchor)
    }

    /// Pixel bounds of the drawing's body, where it has one.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            ProjectedDrawing::Rectangle { rect } => Some(*rect),
            ProjectedDrawing::Bracket {
                left,
                right,
                stop_y,
                profit_y,
                ..
            } => Some(Rect::new(
                *left,
                stop_y.min(*profit_y),
                *right,
                stop_y.max(*profit_y),
            )),
            ProjectedDrawing::Trendline { p0, p1 } | ProjectedDrawing::Fib { p0, p1, .. } => {
                Some(Rect::from_points(*p0, *p1))
            }
            ProjectedDrawing::Vertical { .. } | ProjectedDrawing::HorizontalRay { .. } => None,
        }
    }

    /// Whether `pos` lies on the body of the drawing.
    pub fn body_hit(&self, pos: Point, config: &InteractionConfig) -> bool {
        let tol = config.line_tolerance;
        match self {
            ProjectedDrawing::Trendline { p0, p1 } => point_to_segment_dist(pos, *p0, *p1) <= tol,
            ProjectedDrawing::Vertical { x } => (pos.x - x).abs() <= tol,
            ProjectedDrawing::HorizontalRay { anchor } => {
                point_to_ray_dist(pos, *anchor, Vec2::new(1.0, 0.0)) <= tol
            }
            ProjectedDrawing::Fib { p0, p1, levels } => {
                let (x0, x1) = (p0.x.min(p1.x), p0.x.max(p1.x));
                let on_level = pos.x >= x0 - tol
                    && pos.x <= x1 + tol
                    && levels.iter().any(|l| (pos.y - l.y).abs() <= tol);
                on_level || point_to_segment_dist(pos, *p0, *p1) <= tol
            }
            ProjectedDrawing::Rectangle { .. } | ProjectedDrawing::Bracket { .. } => self
                .bounds()
                .is_some_and(|r| {
                    pos.x >= r.x0 && pos.x <= r.x1 && pos.y >= r.y0 && pos.y <= r.y1
                }),
        }
    }

    /// Tiered hit-test: point handles, then line and edge handles, then the body.
    ///
    /// Within a tier the closest handle wins; ties go to the lower index.
    pub fn hit_test(&self, pos: Point, config: &InteractionConfig) -> Option<HitPart> {
        let handles = self.handles();

        let closest_point = handles
            .iter()
            .filter_map(|h| match h.target {
                HitTarget::Point(p) => {
                    let d = p.distance(pos);
                    (d <= config.handle_tolerance).then_some((h.index, d))
                }
                _ => None,
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = closest_point {
            return Some(HitPart::Handle(index));
        }

        let closest_line = handles
            .iter()
            .filter_map(|h| {
                let (a, b, tol) = match h.target {
                    HitTarget::Line(a, b) => (a, b, config.line_tolerance),
                    HitTarget::Edge(a, b) => (a, b, config.edge_tolerance),
                    HitTarget::Point(_) => return None,
                };
                let d = point_to_segment_dist(pos, a, b);
                (d <= tol).then_some((h.index, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = closest_line {
            return Some(HitPart::Handle(index));
        }

        self.body_hit(pos, config).then_some(HitPart::Body)
    }
}

/// Interaction highlights passed to render primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawingFlags {
    pub is_hovered: bool,
    pub is_selected: bool,
    /// Handle under the pointer, if any.
    pub hovered_part: Option<usize>,
    /// Handle being dragged, if any.
    pub selected_point_index: Option<usize>,
}

/// Distance from a point to a line segment.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Distance from a point to a ray starting at `origin` along `direction`.
pub fn point_to_ray_dist(point: Point, origin: Point, direction: Vec2) -> f64 {
    let len_sq = direction.hypot2();
    let pv = point - origin;
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(direction) / len_sq).max(0.0);
    point.distance(origin + direction * t)
}
