//! Per-kind interaction services.
//!
//! Every drawing kind gets one service: a small state machine that creates,
//! hit-tests, drags and deletes drawings of that kind. The state machine
//! itself is shared ([`KindService`]); what differs per kind lives in a
//! [`DrawingBehavior`].

mod bracket;
mod fib;
mod ray;
mod rectangle;
mod trendline;
mod vertical;

pub use bracket::{BracketBehavior, BracketDragMode, BracketService};
pub use fib::{FibBehavior, FibService};
pub use ray::{RayBehavior, RayDragMode, RayService};
pub use rectangle::{RectDragMode, RectangleBehavior, RectangleService};
pub use trendline::{LineDragMode, TrendlineBehavior, TrendlineService};
pub use vertical::{VerticalBehavior, VerticalDragMode, VerticalService};

use crate::bridge::CoordinateBridge;
use crate::config::InteractionConfig;
use crate::drawing::{Drawing, DrawingId, DrawingKind, DrawingPatch, DrawingPoint, DrawingShape};
use crate::geometry::project;
use crate::pointer::PointerState;
use crate::store::DrawingStore;
use crate::timeframe::Timeframe;
use kurbo::Point;
use std::fmt::Debug;
use winit::keyboard::{Key, NamedKey};

/// Result of hit-testing a drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub drawing_id: DrawingId,
    /// Handle under the pointer; `None` for the whole shape.
    pub handle: Option<usize>,
}

/// Read-only state shared with services for one event.
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub bridge: CoordinateBridge<'a>,
    pub pointer: &'a PointerState,
    pub config: &'a InteractionConfig,
    pub timeframe: Timeframe,
    /// Magnet-resolved domain point of the current press.
    pub down_point: Option<DrawingPoint>,
}

/// A pointer event as seen by services.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// Pointer position in pixels.
    pub position: Point,
    /// Magnet-resolved domain point, `None` when the chart cannot convert.
    pub point: Option<DrawingPoint>,
}

/// How a new drawing is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Committed on the first click.
    SingleClick,
    /// Needs a second click or a drag release.
    TwoPoint,
}

/// An in-progress drag of an existing drawing.
#[derive(Debug, Clone)]
pub struct DragSession<M> {
    pub drawing_id: DrawingId,
    pub mode: M,
    pub handle: Option<usize>,
    /// The drawing as it was when the press landed.
    pub snapshot: Drawing,
    pub start_position: Point,
    /// Pixels of the drawing's anchors at the press, for whole-shape drags.
    pub start_pixels: Option<Vec<Point>>,
    /// Whether the pointer moved past the drag threshold.
    pub started: bool,
}

/// Interaction state of one service.
///
/// `Selected` is not a state of its own: it is read from the store's
/// selected id.
#[derive(Debug, Clone)]
pub enum InteractionState<M> {
    Idle,
    /// Creating a two-point drawing.
    Placing {
        first: DrawingPoint,
        current: DrawingPoint,
        /// Placed with a press-drag-release gesture.
        dragged: bool,
    },
    Dragging(DragSession<M>),
}

impl<M> Default for InteractionState<M> {
    fn default() -> Self {
        InteractionState::Idle
    }
}

/// What varies between drawing kinds.
pub trait DrawingBehavior {
    /// Drag mode of the kind.
    type Mode: Copy + Debug + PartialEq;

    fn name(&self) -> &'static str;

    fn matches(&self, kind: DrawingKind) -> bool;

    fn placement(&self) -> Placement;

    /// Shape for a new drawing. Single-click kinds get `first == second`.
    fn create(
        &self,
        kind: DrawingKind,
        first: DrawingPoint,
        second: DrawingPoint,
        config: &InteractionConfig,
        timeframe: Timeframe,
    ) -> Option<DrawingShape>;

    /// Drag mode for a hit handle (`None` is the whole shape).
    fn drag_mode(&self, handle: Option<usize>) -> Option<Self::Mode>;

    /// Whether the mode moves the whole shape.
    fn is_whole(&self, mode: Self::Mode) -> bool;

    /// Anchors moved by a whole-shape drag.
    fn anchors(&self, shape: &DrawingShape) -> Vec<DrawingPoint>;

    /// Replace the anchors returned by [`anchors`](Self::anchors).
    fn set_anchors(&self, shape: &mut DrawingShape, anchors: &[DrawingPoint]);

    /// Whether whole-shape drags move prices as well as times.
    fn moves_price(&self) -> bool {
        true
    }

    /// Apply a handle drag to `shape`, a copy of the pre-drag geometry.
    fn drag_handle(
        &self,
        shape: &mut DrawingShape,
        mode: Self::Mode,
        point: DrawingPoint,
        bridge: &CoordinateBridge<'_>,
    );
}

/// Interface the drawing manager dispatches through.
pub trait InteractionService {
    fn name(&self) -> &'static str;

    fn kind_matches(&self, kind: DrawingKind) -> bool;

    /// Creation click. Only consumes the click when the armed tool is this kind.
    fn handle_click(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool;

    /// Select a drawing of this kind under the pointer.
    fn handle_selection_click(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool;

    fn handle_pointer_down(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool;

    fn handle_pointer_move(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool;

    fn handle_pointer_up(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool;

    fn handle_key(&mut self, store: &mut DrawingStore, key: &Key) -> bool;

    /// Topmost drawing of this kind under `position`, the selected one first.
    fn hit_test(
        &self,
        store: &DrawingStore,
        ctx: &ServiceContext<'_>,
        position: Point,
    ) -> Option<Hit>;

    fn hovered(&self) -> Option<Hit>;

    fn set_hovered(&mut self, hit: Option<Hit>);

    /// Placing or dragging.
    fn is_busy(&self) -> bool;

    /// Drawing under construction, for rubber-band rendering.
    fn preview(
        &self,
        store: &DrawingStore,
        config: &InteractionConfig,
        timeframe: Timeframe,
    ) -> Option<Drawing>;

    /// Drawing and handle being dragged.
    fn drag_handle(&self) -> Option<Hit>;

    /// Abort whatever is in progress, reverting an active drag.
    fn cancel(&mut self, store: &mut DrawingStore);
}

/// Pixel of a whole-drag anchor. Without price movement only x matters.
fn anchor_pixel(
    bridge: &CoordinateBridge<'_>,
    point: DrawingPoint,
    moves_price: bool,
) -> Option<Point> {
    let x = bridge.time_to_x(point.time)?;
    let y = if moves_price { bridge.price_to_y(point.price)? } else { 0.0 };
    Some(Point::new(x, y))
}

/// Generic interaction state machine for one drawing kind.
#[derive(Debug)]
pub struct KindService<B: DrawingBehavior> {
    behavior: B,
    state: InteractionState<B::Mode>,
    hovered: Option<Hit>,
}

impl<B: DrawingBehavior + Default> Default for KindService<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: DrawingBehavior> KindService<B> {
    pub fn new(behavior: B) -> Self {
        Self {
            behavior,
            state: InteractionState::Idle,
            hovered: None,
        }
    }

    pub fn state(&self) -> &InteractionState<B::Mode> {
        &self.state
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// The armed tool, if it creates drawings of this kind.
    fn armed_kind(&self, store: &DrawingStore) -> Option<DrawingKind> {
        store.active_tool().filter(|kind| self.behavior.matches(*kind))
    }

    /// The selected drawing, if it is of this kind.
    fn selected_own(&self, store: &DrawingStore) -> Option<DrawingId> {
        store
            .selected_drawing()
            .filter(|d| self.behavior.matches(d.kind()))
            .map(Drawing::id)
    }

    fn commit(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        kind: DrawingKind,
        first: DrawingPoint,
        second: DrawingPoint,
    ) {
        self.state = InteractionState::Idle;
        let Some(shape) = self
            .behavior
            .create(kind, first, second, ctx.config, ctx.timeframe)
        else {
            return;
        };
        let drawing = store.new_drawing(shape);
        let id = store.add_drawing(drawing);
        store.set_selected_drawing_id(Some(id));
        log::debug!("Committed {} drawing {}", kind.tag(), id);
    }

    /// Start placing a two-point drawing with a press-drag gesture.
    fn begin_drag_placement(
        &mut self,
        store: &DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool {
        if !ctx.pointer.is_dragging() || self.behavior.placement() != Placement::TwoPoint {
            return false;
        }
        if self.armed_kind(store).is_none() {
            return false;
        }
        let (Some(first), Some(current)) = (ctx.down_point, input.point) else {
            return false;
        };
        self.state = InteractionState::Placing {
            first,
            current,
            dragged: true,
        };
        log::debug!("Placing {} by drag", self.behavior.name());
        true
    }

    fn apply_drag(&self, store: &mut DrawingStore, ctx: &ServiceContext<'_>, input: &PointerInput) {
        let InteractionState::Dragging(session) = &self.state else {
            return;
        };
        let mut shape = session.snapshot.shape.clone();
        if self.behavior.is_whole(session.mode) {
            let Some(start_pixels) = &session.start_pixels else {
                return;
            };
            let delta = input.position - session.start_position;
            let originals = self.behavior.anchors(&session.snapshot.shape);
            let mut moved = Vec::with_capacity(originals.len());
            for (start, original) in start_pixels.iter().zip(&originals) {
                let target = *start + delta;
                let Some(time) = ctx.bridge.x_to_time(target.x) else {
                    return;
                };
                let price = if self.behavior.moves_price() {
                    match ctx.bridge.y_to_price(target.y) {
                        Some(price) => price,
                        None => return,
                    }
                } else {
                    original.price
                };
                moved.push(DrawingPoint::new(time, price));
            }
            self.behavior.set_anchors(&mut shape, &moved);
        } else {
            let Some(point) = input.point else {
                return;
            };
            self.behavior.drag_handle(&mut shape, session.mode, point, &ctx.bridge);
        }
        let mut moved = session.snapshot.clone();
        moved.shape = shape;
        store.update_drawing(session.drawing_id, &DrawingPatch::geometry_of(&moved));
    }

    fn revert_drag(&mut self, store: &mut DrawingStore) {
        if let InteractionState::Dragging(session) = std::mem::take(&mut self.state) {
            log::debug!("Reverted drag of {} drawing {}", self.behavior.name(), session.drawing_id);
            store.replace_drawing(session.snapshot);
        }
    }
}

impl<B: DrawingBehavior> InteractionService for KindService<B> {
    fn name(&self) -> &'static str {
        self.behavior.name()
    }

    fn kind_matches(&self, kind: DrawingKind) -> bool {
        self.behavior.matches(kind)
    }

    fn handle_click(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool {
        let Some(kind) = self.armed_kind(store) else {
            return false;
        };
        let Some(point) = input.point else {
            return true;
        };
        match self.state {
            InteractionState::Idle => match self.behavior.placement() {
                Placement::SingleClick => self.commit(store, ctx, kind, point, point),
                Placement::TwoPoint => {
                    self.state = InteractionState::Placing {
                        first: point,
                        current: point,
                        dragged: false,
                    };
                    log::debug!("Placing {} first anchor", kind.tag());
                }
            },
            InteractionState::Placing { first, .. } => {
                if point.time == first.time {
                    self.state = InteractionState::Idle;
                    log::debug!("Cancelled {} placement on the first anchor's time", kind.tag());
                } else {
                    self.commit(store, ctx, kind, first, point);
                }
            }
            InteractionState::Dragging(_) => {}
        }
        true
    }

    fn handle_selection_click(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool {
        if self.is_busy() {
            return false;
        }
        let Some(hit) = self.hit_test(store, ctx, input.position) else {
            return false;
        };
        store.set_selected_drawing_id(Some(hit.drawing_id));
        log::debug!("Selected {} drawing {}", self.behavior.name(), hit.drawing_id);
        true
    }

    fn handle_pointer_down(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool {
        if self.is_busy() {
            return true;
        }
        if store.active_tool().is_some() {
            return false;
        }
        let Some(hit) = self.hit_test(store, ctx, input.position) else {
            return false;
        };
        let Some(mode) = self.behavior.drag_mode(hit.handle) else {
            return false;
        };
        let Some(snapshot) = store.get(hit.drawing_id).cloned() else {
            return false;
        };
        let moves_price = self.behavior.moves_price();
        let start_pixels = self
            .behavior
            .anchors(&snapshot.shape)
            .into_iter()
            .map(|p| anchor_pixel(&ctx.bridge, p, moves_price))
            .collect::<Option<Vec<_>>>();
        self.state = InteractionState::Dragging(DragSession {
            drawing_id: hit.drawing_id,
            mode,
            handle: hit.handle,
            snapshot,
            start_position: input.position,
            start_pixels,
            started: false,
        });
        true
    }

    fn handle_pointer_move(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool {
        if let InteractionState::Idle = self.state {
            return self.begin_drag_placement(store, ctx, input);
        }
        match &mut self.state {
            InteractionState::Dragging(session) => {
                if !ctx.pointer.drag_started {
                    return true;
                }
                if !session.started {
                    session.started = true;
                    let id = session.drawing_id;
                    log::debug!(
                        "Drag of {} drawing {} started ({:?})",
                        self.behavior.name(),
                        id,
                        session.mode
                    );
                    store.set_selected_drawing_id(Some(id));
                }
                self.apply_drag(store, ctx, input);
                true
            }
            InteractionState::Placing { current, .. } => {
                if let Some(point) = input.point {
                    *current = point;
                }
                true
            }
            InteractionState::Idle => false,
        }
    }

    fn handle_pointer_up(
        &mut self,
        store: &mut DrawingStore,
        ctx: &ServiceContext<'_>,
        input: &PointerInput,
    ) -> bool {
        match self.state {
            InteractionState::Dragging(ref session) => {
                let started = session.started;
                if started {
                    log::debug!(
                        "Drag of {} drawing {} ended",
                        self.behavior.name(),
                        session.drawing_id
                    );
                }
                self.state = InteractionState::Idle;
                started
            }
            InteractionState::Placing {
                first,
                current,
                dragged: true,
            } => {
                let last = input.point.unwrap_or(current);
                match self.armed_kind(store) {
                    Some(kind) if last.time != first.time => {
                        self.commit(store, ctx, kind, first, last)
                    }
                    _ => self.state = InteractionState::Idle,
                }
                true
            }
            InteractionState::Placing { dragged: false, .. } | InteractionState::Idle => false,
        }
    }

    fn handle_key(&mut self, store: &mut DrawingStore, key: &Key) -> bool {
        match key {
            Key::Named(NamedKey::Escape) => match self.state {
                InteractionState::Placing { .. } => {
                    self.state = InteractionState::Idle;
                    log::debug!("Aborted {} placement", self.behavior.name());
                    true
                }
                InteractionState::Dragging(_) => {
                    self.revert_drag(store);
                    true
                }
                InteractionState::Idle => {
                    if self.selected_own(store).is_none() {
                        return false;
                    }
                    store.set_selected_drawing_id(None);
                    true
                }
            },
            Key::Named(NamedKey::Delete) => {
                let Some(id) = self.selected_own(store) else {
                    return false;
                };
                self.state = InteractionState::Idle;
                self.hovered = None;
                store.remove_drawing(id);
                log::debug!("Deleted {} drawing {}", self.behavior.name(), id);
                true
            }
            _ => false,
        }
    }

    fn hit_test(
        &self,
        store: &DrawingStore,
        ctx: &ServiceContext<'_>,
        position: Point,
    ) -> Option<Hit> {
        let selected = store
            .selected_drawing()
            .filter(|d| self.behavior.matches(d.kind()));
        let selected_id = selected.map(Drawing::id);
        let others = store
            .drawings()
            .iter()
            .rev()
            .filter(|d| self.behavior.matches(d.kind()) && Some(d.id()) != selected_id);
        selected.into_iter().chain(others).find_map(|drawing| {
            let part = project(drawing, &ctx.bridge)?.hit_test(position, ctx.config)?;
            Some(Hit {
                drawing_id: drawing.id(),
                handle: part.handle_index(),
            })
        })
    }

    fn hovered(&self) -> Option<Hit> {
        self.hovered
    }

    fn set_hovered(&mut self, hit: Option<Hit>) {
        if self.hovered != hit {
            log::trace!("{} hover: {:?}", self.behavior.name(), hit);
        }
        self.hovered = hit;
    }

    fn is_busy(&self) -> bool {
        !matches!(self.state, InteractionState::Idle)
    }

    fn preview(
        &self,
        store: &DrawingStore,
        config: &InteractionConfig,
        timeframe: Timeframe,
    ) -> Option<Drawing> {
        let InteractionState::Placing { first, current, .. } = self.state else {
            return None;
        };
        let kind = self.armed_kind(store)?;
        let shape = self.behavior.create(kind, first, current, config, timeframe)?;
        Some(store.new_drawing(shape))
    }

    fn drag_handle(&self) -> Option<Hit> {
        match &self.state {
            InteractionState::Dragging(session) if session.started => Some(Hit {
                drawing_id: session.drawing_id,
                handle: session.handle,
            }),
            _ => None,
        }
    }

    fn cancel(&mut self, store: &mut DrawingStore) {
        match self.state {
            InteractionState::Dragging(_) => self.revert_drag(store),
            _ => self.state = InteractionState::Idle,
        }
        self.hovered = None;
    }
}

/// The six services in dispatch order.
pub fn default_services() -> Vec<Box<dyn InteractionService>> {
    vec![
        Box::new(RayService::default()),
        Box::new(TrendlineService::default()),
        Box::new(VerticalService::default()),
        Box::new(FibService::default()),
        Box::new(RectangleService::default()),
        Box::new(BracketService::default()),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for driving a single service without the manager.

    use super::*;
    use crate::viewport::ChartViewport;

    pub struct Harness {
        pub viewport: ChartViewport,
        pub store: DrawingStore,
        pub pointer: PointerState,
        pub config: InteractionConfig,
        pub timeframe: Timeframe,
        pub down_point: Option<DrawingPoint>,
    }

    impl Harness {
        pub fn new(viewport: ChartViewport) -> Self {
            Self {
                viewport,
                store: DrawingStore::new(),
                pointer: PointerState::new(),
                config: InteractionConfig::default(),
                timeframe: Timeframe::default(),
                down_point: None,
            }
        }

        /// Input at a pixel position, converted without magnet.
        pub fn input(&self, x: f64, y: f64) -> PointerInput {
            let bridge = CoordinateBridge::from_host(&self.viewport);
            PointerInput {
                position: Point::new(x, y),
                point: bridge.pixel_to_domain(x, y),
            }
        }

        /// Creation click, falling back to a selection click.
        pub fn click(&mut self, service: &mut dyn InteractionService, x: f64, y: f64) -> bool {
            let input = self.input(x, y);
            let ctx = ServiceContext {
                bridge: CoordinateBridge::from_host(&self.viewport),
                pointer: &self.pointer,
                config: &self.config,
                timeframe: self.timeframe,
                down_point: self.down_point,
            };
            service.handle_click(&mut self.store, &ctx, &input)
                || service.handle_selection_click(&mut self.store, &ctx, &input)
        }

        pub fn down(&mut self, service: &mut dyn InteractionService, x: f64, y: f64) -> bool {
            let input = self.input(x, y);
            self.pointer.press(input.position);
            self.down_point = input.point;
            let ctx = ServiceContext {
                bridge: CoordinateBridge::from_host(&self.viewport),
                pointer: &self.pointer,
                config: &self.config,
                timeframe: self.timeframe,
                down_point: self.down_point,
            };
            service.handle_pointer_down(&mut self.store, &ctx, &input)
        }

        pub fn drag_to(&mut self, service: &mut dyn InteractionService, x: f64, y: f64) -> bool {
            let input = self.input(x, y);
            self.pointer.track_move(input.position, self.config.drag_threshold);
            let ctx = ServiceContext {
                bridge: CoordinateBridge::from_host(&self.viewport),
                pointer: &self.pointer,
                config: &self.config,
                timeframe: self.timeframe,
                down_point: self.down_point,
            };
            service.handle_pointer_move(&mut self.store, &ctx, &input)
        }

        pub fn up(&mut self, service: &mut dyn InteractionService, x: f64, y: f64) -> bool {
            let input = self.input(x, y);
            self.pointer.release();
            let ctx = ServiceContext {
                bridge: CoordinateBridge::from_host(&self.viewport),
                pointer: &self.pointer,
                config: &self.config,
                timeframe: self.timeframe,
                down_point: self.down_point,
            };
            service.handle_pointer_up(&mut self.store, &ctx, &input)
        }

        pub fn hit(&self, service: &dyn InteractionService, x: f64, y: f64) -> Option<Hit> {
            let ctx = ServiceContext {
                bridge: CoordinateBridge::from_host(&self.viewport),
                pointer: &self.pointer,
                config: &self.config,
                timeframe: self.timeframe,
                down_point: self.down_point,
            };
            service.hit_test(&self.store, &ctx, Point::new(x, y))
        }

        /// The only drawing in the store.
        pub fn only(&self) -> &Drawing {
            assert_eq!(self.store.drawings().len(), 1);
            &self.store.drawings()[0]
        }
    }

    pub fn escape() -> Key {
        Key::Named(NamedKey::Escape)
    }

    pub fn delete() -> Key {
        Key::Named(NamedKey::Delete)
    }
}
