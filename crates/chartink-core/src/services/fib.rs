//! Fibonacci retracement service.

use super::trendline::{LineDragMode, set_two_anchors, two_anchors};
use super::{DrawingBehavior, KindService, Placement};
use crate::bridge::CoordinateBridge;
use crate::config::InteractionConfig;
use crate::drawing::{DrawingKind, DrawingPoint, DrawingShape, default_fib_levels};
use crate::timeframe::Timeframe;

#[derive(Debug, Clone, Copy, Default)]
pub struct FibBehavior;

pub type FibService = KindService<FibBehavior>;

impl DrawingBehavior for FibBehavior {
    type Mode = LineDragMode;

    fn name(&self) -> &'static str {
        "fib-retracement"
    }

    fn matches(&self, kind: DrawingKind) -> bool {
        kind == DrawingKind::FibRetracement
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
        Some(DrawingShape::FibRetracement {
            points: [first, second],
            levels: default_fib_levels(),
            show_labels: true,
        })
    }

    fn drag_mode(&self, handle: Option<usize>) -> Option<LineDragMode> {
        LineDragMode::from_handle(handle)
    }

    fn is_whole(&self, mode: LineDragMode) -> bool {
        mode == LineDragMode::Entire
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
        mode: LineDragMode,
        point: DrawingPoint,
        _bridge: &CoordinateBridge<'_>,
    ) {
        if let DrawingShape::FibRetracement { points, .. } = shape {
            mode.apply(points, point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{DrawingPatch, FibLevel, SerializableColor};
    use crate::services::InteractionService;
    use crate::services::testing::{Harness, escape};
    use crate::viewport::fixtures::minute_viewport;

    fn with_fib() -> (Harness, FibService) {
        let mut h = Harness::new(minute_viewport());
        let mut service = FibService::default();
        h.store.set_active_tool(Some(DrawingKind::FibRetracement));
        h.click(&mut service, 100.0, 250.0);
        h.click(&mut service, 500.0, 150.0);
        (h, service)
    }

    #[test]
    fn test_creates_with_default_levels() {
        let (h, _) = with_fib();
        let DrawingShape::FibRetracement {
            levels, show_labels, ..
        } = &h.only().shape
        else {
            panic!("expected retracement");
        };
        assert_eq!(levels.len(), 7);
        assert!(*show_labels);
    }

    #[test]
    fn test_new_fib_uses_edited_levels() {
        let (mut h, mut service) = with_fib();
        let id = h.only().id();
        let custom = vec![FibLevel::new(0.5, SerializableColor::rgb(1, 1, 1))];
        let patch = DrawingPatch {
            levels: Some(custom.clone()),
            ..DrawingPatch::default()
        };
        h.store.update_drawing(id, &patch);

        h.store.set_active_tool(Some(DrawingKind::FibRetracement));
        h.click(&mut service, 200.0, 250.0);
        h.click(&mut service, 600.0, 150.0);
        let DrawingShape::FibRetracement { levels, .. } = &h.store.drawings()[1].shape else {
            panic!("expected retracement");
        };
        assert_eq!(levels, &custom);
    }

    #[test]
    fn test_level_line_drag_moves_whole() {
        let (mut h, mut service) = with_fib();
        // Level 0.5 at y = 200, away from the diagonal.
        assert!(h.down(&mut service, 450.0, 200.0));
        h.drag_to(&mut service, 450.0, 175.0);
        h.up(&mut service, 450.0, 175.0);
        let [p0, p1] = h.only().shape.two_points().unwrap();
        assert_eq!((p0.time, p1.time), (600, 3000));
        assert!((p0.price - 110.0).abs() < 1e-9);
        assert!((p1.price - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_escape_mid_drag_reverts() {
        let (mut h, mut service) = with_fib();
        let before = h.only().clone();
        h.down(&mut service, 100.0, 250.0);
        h.drag_to(&mut service, 20.0, 20.0);
        assert!(service.handle_key(&mut h.store, &escape()));
        assert_eq!(h.only(), &before);
    }
}
