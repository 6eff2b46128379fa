//! Trendline ("line-segment") service.

use super::{DrawingBehavior, KindService, Placement};
use crate::bridge::CoordinateBridge;
use crate::config::InteractionConfig;
use crate::drawing::{DrawingKind, DrawingPoint, DrawingShape};
use crate::timeframe::Timeframe;

/// What a drag on a two-anchor line moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDragMode {
    Entire,
    Point0,
    Point1,
}

impl LineDragMode {
    pub fn from_handle(handle: Option<usize>) -> Option<Self> {
        match handle {
            None => Some(LineDragMode::Entire),
            Some(0) => Some(LineDragMode::Point0),
            Some(1) => Some(LineDragMode::Point1),
            Some(_) => None,
        }
    }

    /// Move the dragged anchor of `points` to `point`.
    pub(super) fn apply(self, points: &mut [DrawingPoint; 2], point: DrawingPoint) {
        match self {
            LineDragMode::Point0 => points[0] = point,
            LineDragMode::Point1 => points[1] = point,
            LineDragMode::Entire => {}
        }
    }
}

pub(super) fn two_anchors(shape: &DrawingShape) -> Vec<DrawingPoint> {
    shape.two_points().map(Vec::from).unwrap_or_default()
}

pub(super) fn set_two_anchors(shape: &mut DrawingShape, anchors: &[DrawingPoint]) {
    if let (Some(points), [a, b]) = (shape.two_points_mut(), anchors) {
        *points = [*a, *b];
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendlineBehavior;

pub type TrendlineService = KindService<TrendlineBehavior>;

impl DrawingBehavior for TrendlineBehavior {
    type Mode = LineDragMode;

    fn name(&self) -> &'static str {
        "trendline"
    }

    fn matches(&self, kind: DrawingKind) -> bool {
        kind == DrawingKind::Trendline
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
        Some(DrawingShape::Trendline {
            points: [first, second],
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
        if let DrawingShape::Trendline { points } = shape {
            mode.apply(points, point);
        }
    }
}
