//! Horizontal ray ("point-ray") service.

use super::{DrawingBehavior, KindService, Placement};
use crate::bridge::CoordinateBridge;
use crate::config::InteractionConfig;
use crate::drawing::{DrawingKind, DrawingPoint, DrawingShape};
use crate::timeframe::Timeframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayDragMode {
    Entire,
    Anchor,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RayBehavior;

pub type RayService = KindService<RayBehavior>;

impl DrawingBehavior for RayBehavior {
    type Mode = RayDragMode;

    fn name(&self) -> &'static str {
        "horizontal ray"
    }

    fn matches(&self, kind: DrawingKind) -> bool {
        kind == DrawingKind::HorizontalRay
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
        Some(DrawingShape::HorizontalRay { anchor: first })
    }

    fn drag_mode(&self, handle: Option<usize>) -> Option<RayDragMode> {
        match handle {
            None => Some(RayDragMode::Entire),
            Some(0) => Some(RayDragMode::Anchor),
            Some(_) => None,
        }
    }

    fn is_whole(&self, mode: RayDragMode) -> bool {
        mode == RayDragMode::Entire
    }

    fn anchors(&self, shape: &DrawingShape) -> Vec<DrawingPoint> {
        match shape {
            DrawingShape::HorizontalRay { anchor } => vec![*anchor],
            _ => Vec::new(),
        }
    }

    fn set_anchors(&self, shape: &mut DrawingShape, anchors: &[DrawingPoint]) {
        if let (DrawingShape::HorizontalRay { anchor }, [moved]) = (shape, anchors) {
            *anchor = *moved;
        }
    }

    fn drag_handle(
        &self,
        shape: &mut DrawingShape,
        mode: RayDragMode,
        point: DrawingPoint,
        _bridge: &CoordinateBridge<'_>,
    ) {
        if let (DrawingShape::HorizontalRay { anchor }, RayDragMode::Anchor) = (shape, mode) {
            *anchor = point;
        }
    }
}
