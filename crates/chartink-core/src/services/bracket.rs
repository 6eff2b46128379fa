//! Long and short position bracket service.
//!
//! One service handles both sides; the side comes from the armed tool when
//! creating and from the stored shape when dragging.

use super::{DrawingBehavior, KindService, Placement};
use crate::bridge::CoordinateBridge;
use crate::config::InteractionConfig;
use crate::drawing::{Bracket, DrawingKind, DrawingPoint, DrawingShape, PositionSide};
use crate::geometry::{
    BRACKET_ENTRY_LINE, BRACKET_PROFIT_LINE, BRACKET_RIGHT_EDGE, BRACKET_STOP_LINE,
};
use crate::timeframe::Timeframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketDragMode {
    Entire,
    EntryLine,
    StopLine,
    ProfitLine,
    RightEdge,
}

impl BracketDragMode {
    pub fn from_handle(handle: Option<usize>) -> Option<Self> {
        match handle {
            None => Some(BracketDragMode::Entire),
            Some(BRACKET_ENTRY_LINE) => Some(BracketDragMode::EntryLine),
            Some(BRACKET_STOP_LINE) => Some(BracketDragMode::StopLine),
            Some(BRACKET_PROFIT_LINE) => Some(BracketDragMode::ProfitLine),
            Some(BRACKET_RIGHT_EDGE) => Some(BracketDragMode::RightEdge),
            Some(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BracketBehavior;

pub type BracketService = KindService<BracketBehavior>;

impl DrawingBehavior for BracketBehavior {
    type Mode = BracketDragMode;

    fn name(&self) -> &'static str {
        "position"
    }

    fn matches(&self, kind: DrawingKind) -> bool {
        kind.is_bracket()
    }

    fn placement(&self) -> Placement {
        Placement::SingleClick
    }

    fn create(
        &self,
        kind: DrawingKind,
        first: DrawingPoint,
        _second: DrawingPoint,
        config: &InteractionConfig,
        timeframe: Timeframe,
    ) -> Option<DrawingShape> {
        let end_time = first.time + config.bracket_default_bars * timeframe.interval_seconds();
        let bracket = |side| {
            Bracket::new(side, first, config.bracket_default_distance, Some(end_time))
        };
        match kind {
            DrawingKind::LongPosition => {
                Some(DrawingShape::LongPosition(bracket(PositionSide::Long)))
            }
            DrawingKind::ShortPosition => {
                Some(DrawingShape::ShortPosition(bracket(PositionSide::Short)))
            }
            _ => None,
        }
    }

    fn drag_mode(&self, handle: Option<usize>) -> Option<BracketDragMode> {
        BracketDragMode::from_handle(handle)
    }

    fn is_whole(&self, mode: BracketDragMode) -> bool {
        mode == BracketDragMode::Entire
    }

    fn anchors(&self, shape: &DrawingShape) -> Vec<DrawingPoint> {
        let Some((b, _)) = shape.bracket() else {
            return Vec::new();
        };
        let mut anchors = vec![b.entry_point, b.stop_point, b.profit_point];
        anchors.extend(b.end_point);
        anchors
    }

    fn set_anchors(&self, shape: &mut DrawingShape, anchors: &[DrawingPoint]) {
        let Some((b, _)) = shape.bracket_mut() else {
            return;
        };
        match anchors {
            [entry, stop, profit, rest @ ..] => {
                b.entry_point = *entry;
                b.stop_point = *stop;
                b.profit_point = *profit;
                if let [end] = rest {
                    b.end_point = Some(*end);
                }
            }
            _ => log::warn!("Bracket needs three anchors, got {}", anchors.len()),
        }
    }

    fn drag_handle(
        &self,
        shape: &mut DrawingShape,
        mode: BracketDragMode,
        point: DrawingPoint,
        _bridge: &CoordinateBridge<'_>,
    ) {
        let Some((b, side)) = shape.bracket_mut() else {
            return;
        };
        match mode {
            BracketDragMode::Entire => {}
            BracketDragMode::EntryLine => {
                let price = b.clamp_entry(point.price);
                let time = b.clamp_entry_time(point.time);
                b.set_entry_time(time);
                b.entry_point.price = price;
                if let Some(end) = &mut b.end_point {
                    end.price = price;
                }
            }
            BracketDragMode::StopLine => b.stop_point.price = b.clamp_stop(side, point.price),
            BracketDragMode::ProfitLine => b.profit_point.price = b.clamp_profit(side, point.price),
            BracketDragMode::RightEdge => {
                let time = b.clamp_end_time(point.time);
                b.end_point = Some(DrawingPoint::new(time, b.entry_point.price));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::Drawing;
    use crate::services::InteractionService;
    use crate::services::testing::{Harness, escape};
    use crate::viewport::fixtures::spaced_viewport;

    fn bracket(d: &Drawing) -> &Bracket {
        d.shape.bracket().map(|(b, _)| b).unwrap()
    }

    /// Long bracket with entry at (50, 375): time 5000, price 50.
    fn with_long(timeframe: Timeframe) -> (Harness, BracketService) {
        let mut h = Harness::new(spaced_viewport(1000));
        h.timeframe = timeframe;
        let mut service = BracketService::default();
        h.store.set_active_tool(Some(DrawingKind::LongPosition));
        assert!(h.click(&mut service, 50.0, 375.0));
        (h, service)
    }

    #[test]
    fn test_long_creation_defaults() {
        let (h, _) = with_long(Timeframe::Hour1);
        let d = h.only();
        assert_eq!(d.kind(), DrawingKind::LongPosition);
        let b = bracket(d);
        assert_eq!(b.entry_point.time, 5000);
        assert!((b.entry_point.price - 50.0).abs() < 1e-9);
        assert!((b.stop_point.price - 30.0).abs() < 1e-9);
        assert!((b.profit_point.price - 70.0).abs() < 1e-9);
        assert_eq!(b.end_point.map(|p| p.time), Some(5000 + 50 * 3600));
        assert_eq!(h.store.selected_drawing_id(), Some(d.id()));
        assert_eq!(h.store.active_tool(), None);
    }

    #[test]
    fn test_short_creation_flips_levels() {
        let mut h = Harness::new(spaced_viewport(1000));
        let mut service = BracketService::default();
        h.store.set_active_tool(Some(DrawingKind::ShortPosition));
        h.click(&mut service, 50.0, 375.0);
        let b = bracket(h.only());
        assert!((b.stop_point.price - 70.0).abs() < 1e-9);
        assert!((b.profit_point.price - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_drag_clamps_at_entry() {
        let (mut h, mut service) = with_long(Timeframe::Hour1);
        assert!(h.down(&mut service, 100.0, 425.0));
        h.drag_to(&mut service, 100.0, 350.0);
        assert_eq!(
            service.drag_handle().and_then(|hit| hit.handle),
            Some(BRACKET_STOP_LINE)
        );
        assert!((bracket(h.only()).stop_point.price - 50.0).abs() < 1e-9);

        h.drag_to(&mut service, 100.0, 450.0);
        h.up(&mut service, 100.0, 450.0);
        assert!((bracket(h.only()).stop_point.price - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_entry_drag_moves_left_edge() {
        let (mut h, mut service) = with_long(Timeframe::Hour1);
        assert!(h.down(&mut service, 200.0, 375.0));
        h.drag_to(&mut service, 300.0, 350.0);
        h.up(&mut service, 300.0, 350.0);

        let b = bracket(h.only());
        assert_eq!(b.entry_point.time, 30000);
        assert!((b.entry_point.price - 60.0).abs() < 1e-9);
        assert_eq!(b.stop_point.time, 30000);
        assert_eq!(b.profit_point.time, 30000);
        assert!((b.stop_point.price - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_edge_drag_clamps() {
        // One-minute bars put the right edge at 8000, x = 80.
        let (mut h, mut service) = with_long(Timeframe::Min1);
        assert_eq!(bracket(h.only()).right_time(), 8000);
        assert!(h.down(&mut service, 80.0, 340.0));
        h.drag_to(&mut service, 120.0, 340.0);
        assert_eq!(bracket(h.only()).right_time(), 12000);

        h.drag_to(&mut service, 20.0, 340.0);
        h.up(&mut service, 20.0, 340.0);
        assert_eq!(bracket(h.only()).right_time(), 5000);
    }

    #[test]
    fn test_body_drag_moves_everything() {
        let (mut h, mut service) = with_long(Timeframe::Hour1);
        assert!(h.down(&mut service, 200.0, 400.0));
        h.drag_to(&mut service, 250.0, 410.0);
        h.up(&mut service, 250.0, 410.0);

        let b = bracket(h.only());
        assert_eq!(b.entry_point.time, 10000);
        assert_eq!(b.stop_point.time, 10000);
        assert!((b.entry_point.price - 46.0).abs() < 1e-9);
        assert!((b.stop_point.price - 26.0).abs() < 1e-9);
        assert!((b.profit_point.price - 66.0).abs() < 1e-9);
        assert_eq!(b.right_time(), 190000);
    }

    #[test]
    fn test_escape_restores_bracket() {
        let (mut h, mut service) = with_long(Timeframe::Hour1);
        let before = h.only().clone();
        h.down(&mut service, 100.0, 325.0);
        h.drag_to(&mut service, 100.0, 250.0);
        assert!((bracket(h.only()).profit_point.price - 100.0).abs() < 1e-9);
        assert!(service.handle_key(&mut h.store, &escape()));
        assert_eq!(h.only(), &before);
    }
}
