//! Rectangle ("date-price range") service.

use super::trendline::{set_two_anchors, two_anchors};
use super::{DrawingBehavior, KindService, Placement};
use crate::bridge::CoordinateBridge;
use crate::config::InteractionConfig;
use crate::drawing::{DrawingKind, DrawingPoint, DrawingShape};
use crate::geometry::{Corner, Edge};
use crate::timeframe::Timeframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectDragMode {
    Entire,
    Corner(Corner),
    Edge(Edge),
}

impl RectDragMode {
    pub fn from_handle(handle: Option<usize>) -> Option<Self> {
        let Some(index) = handle else {
            return Some(RectDragMode::Entire);
        };
        Corner::from_handle(index)
            .map(RectDragMode::Corner)
            .or_else(|| Edge::from_handle(index).map(RectDragMode::Edge))
    }
}

/// Which of the two stored points forms each side of the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sides {
    left: usize,
    top: usize,
}

impl Sides {
    /// Sides as drawn on screen, falling back to domain order when the
    /// points cannot be projected.
    fn of(points: &[DrawingPoint; 2], bridge: &CoordinateBridge<'_>) -> Self {
        let pixels = (
            bridge.domain_to_pixel(points[0]),
            bridge.domain_to_pixel(points[1]),
        );
        match pixels {
            (Some(a), Some(b)) => Self {
                left: if a.x <= b.x { 0 } else { 1 },
                top: if a.y <= b.y { 0 } else { 1 },
            },
            _ => Self {
                left: if points[0].time <= points[1].time { 0 } else { 1 },
                top: if points[0].price >= points[1].price { 0 } else { 1 },
            },
        }
    }

    fn right(self) -> usize {
        1 - self.left
    }

    fn bottom(self) -> usize {
        1 - self.top
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RectangleBehavior;

pub type RectangleService = KindService<RectangleBehavior>;

impl DrawingBehavior for RectangleBehavior {
    type Mode = RectDragMode;

    fn name(&self) -> &'static str {
        "rectangle"
    }

    fn matches(&self, kind: DrawingKind) -> bool {
        kind == DrawingKind::Rectangle
    }

    fn placement(&self) -> Placement {
        Placement::TwoPoint
    }

    fn create(
        &self,
        _kind: DrawingKind,
        first: DrawingPoint,
        second: DrawingPoint,
        _config: &InteractionConfig,
        _timeframe: Timeframe,
    ) -> Option<DrawingShape> {
        Some(DrawingShape::Rectangle {
            points: [first, second],
        })
    }

    fn drag_mode(&self, handle: Option<usize>) -> Option<RectDragMode> {
        RectDragMode::from_handle(handle)
    }

    fn is_whole(&self, mode: RectDragMode) -> bool {
        mode == RectDragMode::Entire
    }

    fn anchors(&self, shape: &DrawingShape) -> Vec<DrawingPoint> {
        two_anchors(shape)
    }

    fn set_anchors(&self, shape: &mut DrawingShape, anchors: &[DrawingPoint]) {
        set_two_anchors(shape, anchors);
    }

    fn drag_handle(
        &self,
        shape: &mut DrawingShape,
        mode: RectDragMode,
        point: DrawingPoint,
        bridge: &CoordinateBridge<'_>,
    ) {
        let DrawingShape::Rectangle { points } = shape else {
            return;
        };
        let sides = Sides::of(points, bridge);
        let (time_index, price_index) = match mode {
            RectDragMode::Entire => return,
            RectDragMode::Corner(Corner::TopLeft) => (Some(sides.left), Some(sides.top)),
            RectDragMode::Corner(Corner::TopRight) => (Some(sides.right()), Some(sides.top)),
            RectDragMode::Corner(Corner::BottomLeft) => (Some(sides.left), Some(sides.bottom())),
            RectDragMode::Corner(Corner::BottomRight) => {
                (Some(sides.right()), Some(sides.bottom()))
            }
            RectDragMode::Edge(Edge::Top) => (None, Some(sides.top)),
            RectDragMode::Edge(Edge::Bottom) => (None, Some(sides.bottom())),
            RectDragMode::Edge(Edge::Left) => (Some(sides.left), None),
            RectDragMode::Edge(Edge::Right) => (Some(sides.right()), None),
        };
        if let Some(i) = time_index {
            points[i].time = point.time;
        }
        if let Some(i) = price_index {
            points[i].price = point.price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InteractionService;
    use crate::services::testing::{Harness, escape};
    use crate::viewport::fixtures::spaced_viewport;

    fn points(h: &Harness) -> [DrawingPoint; 2] {
        h.only().shape.two_points().unwrap()
    }

    /// Rectangle spanning x 100..300 and y 150..250.
    fn with_rect() -> (Harness, RectangleService) {
        let mut h = Harness::new(spaced_viewport(1000));
        let mut service = RectangleService::default();
        h.store.set_active_tool(Some(DrawingKind::Rectangle));
        h.click(&mut service, 100.0, 250.0);
        h.click(&mut service, 300.0, 150.0);
        (h, service)
    }

    #[test]
    fn test_two_click_creation() {
        let mut h = Harness::new(spaced_viewport(1000));
        let mut service = RectangleService::default();
        h.store.set_active_tool(Some(DrawingKind::Rectangle));
        assert!(h.click(&mut service, 10.0, 250.0));
        assert!(h.drag_to(&mut service, 15.0, 220.0));
        assert!(h.click(&mut service, 20.0, 200.0));

        let [p0, p1] = points(&h);
        assert_eq!(p0.time, 1000);
        assert!((p0.price - 100.0).abs() < 1e-9);
        assert_eq!(p1.time, 2000);
        assert!((p1.price - 120.0).abs() < 1e-9);
        assert_eq!(h.store.active_tool(), None);
        assert_eq!(h.store.selected_drawing_id(), Some(h.only().id()));
    }

    #[test]
    fn test_handle_modes() {
        assert_eq!(RectDragMode::from_handle(None), Some(RectDragMode::Entire));
        assert_eq!(
            RectDragMode::from_handle(Some(3)),
            Some(RectDragMode::Corner(Corner::BottomRight))
        );
        assert_eq!(
            RectDragMode::from_handle(Some(7)),
            Some(RectDragMode::Edge(Edge::Left))
        );
        assert_eq!(RectDragMode::from_handle(Some(8)), None);
    }

    #[test]
    fn test_corner_drag() {
        let (mut h, mut service) = with_rect();
        assert!(h.down(&mut service, 100.0, 150.0));
        h.drag_to(&mut service, 50.0, 100.0);
        assert_eq!(service.drag_handle().and_then(|hit| hit.handle), Some(0));
        h.up(&mut service, 50.0, 100.0);

        let [p0, p1] = points(&h);
        assert_eq!((p0.time, p1.time), (5000, 30000));
        assert!((p0.price - 100.0).abs() < 1e-9);
        assert!((p1.price - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_drag_moves_one_side() {
        let (mut h, mut service) = with_rect();
        assert!(h.down(&mut service, 302.0, 200.0));
        h.drag_to(&mut service, 400.0, 220.0);
        h.up(&mut service, 400.0, 220.0);

        let [p0, p1] = points(&h);
        assert_eq!((p0.time, p1.time), (10000, 40000));
        assert!((p0.price - 100.0).abs() < 1e-9);
        assert!((p1.price - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_body_drag() {
        let (mut h, mut service) = with_rect();
        assert!(h.down(&mut service, 200.0, 200.0));
        h.drag_to(&mut service, 250.0, 225.0);
        h.up(&mut service, 250.0, 225.0);

        let [p0, p1] = points(&h);
        assert_eq!((p0.time, p1.time), (15000, 35000));
        assert!((p0.price - 90.0).abs() < 1e-9);
        assert!((p1.price - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_escape_restores_corner_drag() {
        let (mut h, mut service) = with_rect();
        let before = h.only().clone();
        h.down(&mut service, 300.0, 250.0);
        h.drag_to(&mut service, 420.0, 330.0);
        assert_ne!(h.only(), &before);
        assert!(service.handle_key(&mut h.store, &escape()));
        assert_eq!(h.only(), &before);
    }
}
