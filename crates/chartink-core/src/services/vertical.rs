//! Vertical line service.

use super::{DrawingBehavior, KindService, Placement};
use crate::bridge::CoordinateBridge;
use crate::config::InteractionConfig;
use crate::drawing::{DrawingKind, DrawingPoint, DrawingShape};
use crate::timeframe::Timeframe;

/// A vertical line has no handles; it only moves as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDragMode {
    Entire,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalBehavior;

pub type VerticalService = KindService<VerticalBehavior>;

impl DrawingBehavior for VerticalBehavior {
    type Mode = VerticalDragMode;

    fn name(&self) -> &'static str {
        "vertical line"
    }

    fn matches(&self, kind: DrawingKind) -> bool {
        kind == DrawingKind::Vertical
    }

    fn placement(&self) -> Placement {
        Placement::SingleClick
    }

    fn create(
        &self,
        _kind: DrawingKind,
        first: DrawingPoint,
        _second: DrawingPoint,
        _config: &InteractionConfig,
        _timeframe: Timeframe,
    ) -> Option<DrawingShape> {
        Some(DrawingShape::Vertical { time: first.time })
    }

    fn drag_mode(&self, handle: Option<usize>) -> Option<VerticalDragMode> {
        handle.is_none().then_some(VerticalDragMode::Entire)
    }

    fn is_whole(&self, _mode: VerticalDragMode) -> bool {
        true
    }

    fn anchors(&self, shape: &DrawingShape) -> Vec<DrawingPoint> {
        match shape {
            DrawingShape::Vertical { time } => vec![DrawingPoint::new(*time, 0.0)],
            _ => Vec::new(),
        }
    }

    fn set_anchors(&self, shape: &mut DrawingShape, anchors: &[DrawingPoint]) {
        if let (DrawingShape::Vertical { time }, [moved]) = (shape, anchors) {
            *time = moved.time;
        }
    }

    fn moves_price(&self) -> bool {
        false
    }

    fn drag_handle(
        &self,
        _shape: &mut DrawingShape,
        _mode: VerticalDragMode,
        _point: DrawingPoint,
        _bridge: &CoordinateBridge<'_>,
    ) {
    }
}
