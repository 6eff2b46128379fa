//! Overlay pass: paints every stored drawing plus the one being placed.

use crate::primitives::primitive_for;
use crate::renderer::{OverlayStyle, Painter, RenderResult};
use chartink_core::drawing::{Drawing, DrawingShape, SerializableColor};
use chartink_core::{
    ChartHost, CoordinateBridge, DrawingFlags, DrawingManager, DrawingStore, project,
};
use kurbo::Rect;

/// Paints a store's drawings with the manager's interaction highlights.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: OverlayStyle) -> RenderResult<Self> {
        style.validate()?;
        Ok(Self { style })
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Paint all drawings, in store order, then the placement preview.
    ///
    /// Drawings that cannot be projected on the current host are skipped.
    /// Returns the number of drawings painted.
    pub fn render<H: ChartHost + ?Sized>(
        &self,
        host: &H,
        store: &DrawingStore,
        manager: &DrawingManager,
        pane: Rect,
        painter: &mut dyn Painter,
    ) -> usize {
        let bridge = CoordinateBridge::from_host(host);
        let mut painted = 0;

        for drawing in store.drawings() {
            let flags = manager.render_flags(store, drawing.id());
            if self.paint_one(drawing, &bridge, flags, pane, painter) {
                painted += 1;
            }
        }

        if let Some(mut preview) = manager.preview(store) {
            fade(&mut preview, self.style.preview_alpha);
            if self.paint_one(&preview, &bridge, DrawingFlags::default(), pane, painter) {
                painted += 1;
            }
        }
        painted
    }

    fn paint_one(
        &self,
        drawing: &Drawing,
        bridge: &CoordinateBridge<'_>,
        flags: DrawingFlags,
        pane: Rect,
        painter: &mut dyn Painter,
    ) -> bool {
        let Some(geometry) = project(drawing, bridge) else {
            log::trace!("Drawing {} is off the series, not painted", drawing.id());
            return false;
        };
        let mut primitive = primitive_for(drawing);
        primitive.update_data(geometry, flags);
        primitive.paint(painter, &self.style, pane);
        true
    }
}

fn faded(color: SerializableColor, alpha: f32) -> SerializableColor {
    color.with_alpha((f32::from(color.a) * alpha).round() as u8)
}

/// Scale every color of `drawing` by `alpha`.
fn fade(drawing: &mut Drawing, alpha: f32) {
    drawing.style.color = faded(drawing.style.color, alpha);
    drawing.style.fill_color = drawing.style.fill_color.map(|c| faded(c, alpha));
    match &mut drawing.shape {
        DrawingShape::FibRetracement { levels, .. } => {
            for level in levels {
                level.color = faded(level.color, alpha);
            }
        }
        DrawingShape::LongPosition(b) | DrawingShape::ShortPosition(b) => {
            b.profit_color = faded(b.profit_color, alpha);
            b.stop_color = faded(b.stop_color, alpha);
            b.line_color = faded(b.line_color, alpha);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{Op, RecordingPainter};
    use chartink_core::drawing::{DrawingKind, DrawingPoint, DrawingStyle};
    use chartink_core::services::ServiceContext;
    use chartink_core::{
        Candle, ChartViewport, Hit, InteractionConfig, InteractionService, PointerState, Timeframe,
    };
    use kurbo::Point;

    const PANE: Rect = Rect::new(0.0, 0.0, 1000.0, 500.0);

    /// 100 one-second candles; candle `i` at x = 10 * i, price p at y = (200 - p) * 2.5.
    fn viewport() -> ChartViewport {
        let samples = (0..100)
            .map(|i| Candle::new(i, 100.0, 102.0, 99.0, 101.0))
            .collect();
        ChartViewport::new(samples, 1000.0, 500.0, (0.0, 200.0))
    }

    /// Minute candles, so most stored times fall between bars.
    fn minute_viewport() -> ChartViewport {
        let samples = (0..100)
            .map(|i| Candle::new(i * 60, 100.0, 102.0, 99.0, 101.0))
            .collect();
        ChartViewport::new(samples, 1000.0, 500.0, (0.0, 200.0))
    }

    fn trendline(store: &mut DrawingStore) -> Drawing {
        let drawing = store.new_drawing(DrawingShape::Trendline {
            points: [DrawingPoint::new(10, 100.0), DrawingPoint::new(50, 140.0)],
        });
        store.add_drawing(drawing.clone());
        drawing
    }

    #[test]
    fn test_empty_store_paints_nothing() {
        let host = viewport();
        let mut painter = RecordingPainter::default();
        let count = OverlayRenderer::new().render(
            &host,
            &DrawingStore::new(),
            &DrawingManager::default(),
            PANE,
            &mut painter,
        );
        assert_eq!(count, 0);
        assert!(painter.ops.is_empty());
    }

    #[test]
    fn test_paints_projected_drawing() {
        let host = viewport();
        let mut store = DrawingStore::new();
        trendline(&mut store);
        let mut painter = RecordingPainter::default();
        let manager = DrawingManager::default();
        let count = OverlayRenderer::new().render(&host, &store, &manager, PANE, &mut painter);
        assert_eq!(count, 1);
        assert_eq!(
            painter.ops,
            vec![Op::Stroke {
                bounds: Rect::new(100.0, 150.0, 500.0, 250.0),
                width: 2.0,
                dashed: false,
                color: DrawingStyle::default().color,
            }]
        );
    }

    #[test]
    fn test_selection_adds_handles() {
        let host = viewport();
        let mut store = DrawingStore::new();
        let drawing = trendline(&mut store);
        store.set_selected_drawing_id(Some(drawing.id()));
        let mut painter = RecordingPainter::default();
        let manager = DrawingManager::default();
        OverlayRenderer::new().render(&host, &store, &manager, PANE, &mut painter);
        assert_eq!(painter.fills().len(), 2);
        assert_eq!(painter.strokes().len(), 3);
    }

    #[test]
    fn test_preview_is_faded() {
        let mut host = viewport();
        let mut store = DrawingStore::new();
        let mut manager = DrawingManager::default();
        store.set_active_tool(Some(DrawingKind::Trendline));

        let start = Point::new(100.0, 250.0);
        manager.pointer_down(&host, &mut store, start);
        manager.pointer_up(&host, &mut store, start);
        assert!(manager.click(&host, &mut store, start, 0));
        manager.pointer_move(&mut host, &mut store, Point::new(300.0, 200.0));

        let mut painter = RecordingPainter::default();
        let count = OverlayRenderer::new().render(&host, &store, &manager, PANE, &mut painter);
        assert_eq!(count, 1);
        assert!(store.is_empty());
        let Some(Op::Stroke { color, .. }) = painter.ops.first() else {
            panic!("expected preview stroke");
        };
        assert!((i32::from(color.a) - 153).abs() <= 1);
    }

    /// Centers of the handle-sized fills, in paint order.
    fn painted_handles(painter: &RecordingPainter, size: f64) -> Vec<Point> {
        painter
            .fills()
            .into_iter()
            .filter_map(|op| match op {
                Op::Fill { bounds, .. }
                    if (bounds.width() - size).abs() < 0.5
                        && (bounds.height() - size).abs() < 0.5 =>
                {
                    Some(bounds.center())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_painted_handles_hit_between_bars() {
        let host = minute_viewport();
        let mut store = DrawingStore::new();
        // 1000 s and 2950 s sit between the 60 s bars.
        let (a, b) = (1000, 2950);
        let shapes = vec![
            DrawingShape::Trendline {
                points: [DrawingPoint::new(a, 100.0), DrawingPoint::new(b, 140.0)],
            },
            DrawingShape::FibRetracement {
                points: [DrawingPoint::new(a, 100.0), DrawingPoint::new(b, 140.0)],
                levels: chartink_core::drawing::default_fib_levels(),
                show_labels: true,
            },
            DrawingShape::HorizontalRay {
                anchor: DrawingPoint::new(a, 180.0),
            },
            DrawingShape::Rectangle {
                points: [DrawingPoint::new(a, 20.0), DrawingPoint::new(b, 60.0)],
            },
            DrawingShape::LongPosition(chartink_core::Bracket::new(
                chartink_core::drawing::PositionSide::Long,
                DrawingPoint::new(a, 120.0),
                20.0,
                Some(b),
            )),
        ];
        let ids: Vec<_> = shapes
            .into_iter()
            .map(|shape| store.add_drawing(store.new_drawing(shape)))
            .collect();

        let manager = DrawingManager::default();
        let renderer = OverlayRenderer::new();
        let pointer = PointerState::new();
        let config = InteractionConfig::default();
        let ctx = ServiceContext {
            bridge: CoordinateBridge::from_host(&host),
            pointer: &pointer,
            config: &config,
            timeframe: Timeframe::default(),
            down_point: None,
        };

        for id in ids {
            store.set_selected_drawing_id(Some(id));
            let mut painter = RecordingPainter::default();
            renderer.render(&host, &store, &manager, PANE, &mut painter);
            let centers = painted_handles(&painter, renderer.style().handle_size);

            let Some(drawing) = store.get(id) else {
                panic!("drawing missing");
            };
            let expected: Vec<usize> = project(drawing, &ctx.bridge)
                .map(|g| g.handles().iter().map(|h| h.index).collect())
                .unwrap_or_default();
            assert!(!expected.is_empty());
            assert_eq!(centers.len(), expected.len(), "{:?}", drawing.kind());

            let Some(service) = manager
                .services()
                .iter()
                .find(|s| s.kind_matches(drawing.kind()))
            else {
                panic!("no service for {:?}", drawing.kind());
            };
            for (center, index) in centers.into_iter().zip(expected) {
                assert_eq!(
                    service.hit_test(&store, &ctx, center),
                    Some(Hit {
                        drawing_id: id,
                        handle: Some(index),
                    }),
                    "{:?} handle {index} at {center:?}",
                    drawing.kind(),
                );
            }
        }
    }

    #[test]
    fn test_painted_vertical_hits_between_bars() {
        let host = minute_viewport();
        let mut store = DrawingStore::new();
        let id = store.add_drawing(store.new_drawing(DrawingShape::Vertical { time: 2950 }));
        let manager = DrawingManager::default();
        let mut painter = RecordingPainter::default();
        OverlayRenderer::new().render(&host, &store, &manager, PANE, &mut painter);
        let Some(Op::Stroke { bounds, .. }) = painter.ops.first() else {
            panic!("expected vertical stroke");
        };
        // 2950 s snaps to the bar at 2940 s.
        assert!((bounds.x0 - 490.0).abs() < 1e-9);

        let pointer = PointerState::new();
        let config = InteractionConfig::default();
        let ctx = ServiceContext {
            bridge: CoordinateBridge::from_host(&host),
            pointer: &pointer,
            config: &config,
            timeframe: Timeframe::default(),
            down_point: None,
        };
        let hits: Vec<Hit> = manager
            .services()
            .iter()
            .filter_map(|s| s.hit_test(&store, &ctx, Point::new(bounds.x0, 250.0)))
            .collect();
        assert_eq!(
            hits,
            vec![Hit {
                drawing_id: id,
                handle: None,
            }]
        );
    }

    #[test]
    fn test_rejects_invalid_style() {
        let style = OverlayStyle {
            hover_width_boost: -1.0,
            ..OverlayStyle::default()
        };
        assert!(OverlayRenderer::with_style(style).is_err());
        assert!(OverlayRenderer::with_style(OverlayStyle::default()).is_ok());
    }

    #[test]
    fn test_fade_scales_bracket_colors() {
        let mut store = DrawingStore::new();
        let mut drawing = store.new_drawing(DrawingShape::LongPosition(chartink_core::Bracket::new(
            chartink_core::drawing::PositionSide::Long,
            DrawingPoint::new(0, 10.0),
            1.0,
            None,
        )));
        fade(&mut drawing, 0.5);
        let (bracket, _) = drawing.shape.bracket().unwrap();
        assert_eq!(bracket.line_color.a, 128);
        assert_eq!(bracket.profit_color.a, 32);
        assert_eq!(drawing.style.color.a, 128);
    }
}
