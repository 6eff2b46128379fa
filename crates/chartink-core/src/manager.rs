//! Drawing manager: the single entry point for chart pointer and key events.
//!
//! The manager owns the pointer latch and the magnet resolver shared by all
//! services, resolves magnet-adjusted coordinates once per event and
//! dispatches through the ordered service list until a service reports that
//! it handled the event.

use crate::bridge::CoordinateBridge;
use crate::chart::ChartHost;
use crate::config::InteractionConfig;
use crate::drawing::{Drawing, DrawingId, DrawingPoint};
use crate::geometry::DrawingFlags;
use crate::magnet::{MagnetResolver, MagnetResult};
use crate::pointer::PointerState;
use crate::services::{InteractionService, PointerInput, ServiceContext, default_services};
use crate::store::DrawingStore;
use crate::timeframe::Timeframe;
use kurbo::Point;
use winit::keyboard::{Key, NamedKey};

/// Dispatcher between the host chart and the interaction services.
pub struct DrawingManager {
    services: Vec<Box<dyn InteractionService>>,
    pointer: PointerState,
    magnet: MagnetResolver,
    config: InteractionConfig,
    timeframe: Timeframe,
    /// Magnet-resolved point of the current press.
    down_point: Option<DrawingPoint>,
}

impl Default for DrawingManager {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl DrawingManager {
    /// Manager over the six built-in services.
    pub fn new(config: InteractionConfig) -> Self {
        Self::with_services(default_services(), config)
    }

    /// Manager over a custom service list, dispatched in order.
    pub fn with_services(
        services: Vec<Box<dyn InteractionService>>,
        config: InteractionConfig,
    ) -> Self {
        Self {
            services,
            pointer: PointerState::new(),
            magnet: MagnetResolver::default(),
            config,
            timeframe: Timeframe::default(),
            down_point: None,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn magnet(&self) -> &MagnetResolver {
        &self.magnet
    }

    pub fn magnet_mut(&mut self) -> &mut MagnetResolver {
        &mut self.magnet
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Timeframe used for new bracket widths.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
    }

    pub fn services(&self) -> &[Box<dyn InteractionService>] {
        &self.services
    }

    /// Whether magnet snapping may apply: a tool is armed, a drawing is
    /// selected, or a service is busy with or hovering a drawing.
    fn context_active(&self, store: &DrawingStore) -> bool {
        store.active_tool().is_some()
            || store.selected_drawing_id().is_some()
            || self
                .services
                .iter()
                .any(|s| s.is_busy() || s.hovered().is_some())
    }

    /// Convert a pixel position and run it through the magnet.
    fn resolve(
        &self,
        bridge: &CoordinateBridge<'_>,
        position: Point,
        context_active: bool,
    ) -> (PointerInput, Option<MagnetResult>) {
        let raw = bridge.pixel_to_domain(position.x, position.y);
        let result = raw.map(|raw| self.magnet.resolve(bridge, raw, context_active));
        let input = PointerInput {
            position,
            point: result.map(|r| r.point),
        };
        (input, result)
    }

    /// Latch a press, then offer it to the services.
    pub fn pointer_down<H: ChartHost + ?Sized>(
        &mut self,
        host: &H,
        store: &mut DrawingStore,
        position: Point,
    ) -> bool {
        self.pointer.press(position);
        let bridge = CoordinateBridge::from_host(host);
        let (input, _) = self.resolve(&bridge, position, self.context_active(store));
        self.down_point = input.point;

        let ctx = ServiceContext {
            bridge,
            pointer: &self.pointer,
            config: &self.config,
            timeframe: self.timeframe,
            down_point: self.down_point,
        };
        for service in self.services.iter_mut() {
            if service.handle_pointer_down(store, &ctx, &input) {
                log::debug!("Pointer down handled by {}", service.name());
                return true;
            }
        }
        false
    }

    /// Track a move: drag threshold, magnet and crosshair, dispatch, hover.
    pub fn pointer_move<H: ChartHost + ?Sized>(
        &mut self,
        host: &mut H,
        store: &mut DrawingStore,
        position: Point,
    ) -> bool {
        if self.pointer.track_move(position, self.config.drag_threshold) {
            log::debug!("Drag threshold crossed at ({:.1}, {:.1})", position.x, position.y);
        }

        let context_active = self.context_active(store);
        let (input, snap) = {
            let bridge = CoordinateBridge::from_host(&*host);
            self.resolve(&bridge, position, context_active)
        };
        if let Some(snap) = snap.filter(MagnetResult::is_snapped) {
            host.set_crosshair_position(snap.point.price, snap.point.time);
        }

        let ctx = ServiceContext {
            bridge: CoordinateBridge::from_host(&*host),
            pointer: &self.pointer,
            config: &self.config,
            timeframe: self.timeframe,
            down_point: self.down_point,
        };
        if let Some(service) = self.services.iter_mut().find(|s| s.is_busy()) {
            return service.handle_pointer_move(store, &ctx, &input);
        }
        for service in self.services.iter_mut() {
            if service.handle_pointer_move(store, &ctx, &input) {
                return true;
            }
        }

        // Hover: the first service with a hit owns the hover.
        let mut owner_found = false;
        for service in self.services.iter_mut() {
            let hit = if owner_found || self.pointer.is_down {
                None
            } else {
                service.hit_test(store, &ctx, position)
            };
            owner_found |= hit.is_some();
            service.set_hovered(hit);
        }
        false
    }

    /// Finish the gesture: a busy service resolves its drag before the
    /// latch is released.
    pub fn pointer_up<H: ChartHost + ?Sized>(
        &mut self,
        host: &H,
        store: &mut DrawingStore,
        position: Point,
    ) -> bool {
        let bridge = CoordinateBridge::from_host(host);
        let (input, _) = self.resolve(&bridge, position, self.context_active(store));
        let ctx = ServiceContext {
            bridge,
            pointer: &self.pointer,
            config: &self.config,
            timeframe: self.timeframe,
            down_point: self.down_point,
        };
        let handled = match self.services.iter_mut().find(|s| s.is_busy()) {
            Some(service) => service.handle_pointer_up(store, &ctx, &input),
            None => false,
        };
        self.pointer.release();
        self.down_point = None;
        handled
    }

    /// Dispatch a click delivered by the host at `time_ms`.
    ///
    /// Clicks ending a drag and duplicates inside the debounce window are
    /// discarded. Creation handlers run first, then selection handlers; a
    /// click that nothing claims clears the selection.
    pub fn click<H: ChartHost + ?Sized>(
        &mut self,
        host: &H,
        store: &mut DrawingStore,
        position: Point,
        time_ms: u64,
    ) -> bool {
        if !self.pointer.accept_click(time_ms, self.config.duplicate_click_ms) {
            return false;
        }

        let bridge = CoordinateBridge::from_host(host);
        let context_active = store.active_tool().is_some() || store.selected_drawing_id().is_some();
        let (mut input, snap) = self.resolve(&bridge, position, context_active);
        if let Some(snap) = snap.filter(MagnetResult::is_snapped) {
            // Services see the snapped point where it is painted.
            if let Some(pixel) = bridge.domain_to_pixel(snap.point) {
                input.position = pixel;
            }
        }

        let ctx = ServiceContext {
            bridge,
            pointer: &self.pointer,
            config: &self.config,
            timeframe: self.timeframe,
            down_point: self.down_point,
        };
        for service in self.services.iter_mut() {
            if service.handle_click(store, &ctx, &input) {
                log::debug!("Click handled by {}", service.name());
                return true;
            }
        }
        for service in self.services.iter_mut() {
            if service.handle_selection_click(store, &ctx, &input) {
                return true;
            }
        }
        if store.selected_drawing_id().is_some() {
            log::debug!("Click on empty space cleared the selection");
            store.set_selected_drawing_id(None);
        }
        false
    }

    /// Ctrl forces the magnet on; other keys go to the services in order.
    pub fn key_down(&mut self, store: &mut DrawingStore, key: &Key) -> bool {
        if let Key::Named(NamedKey::Control) = key {
            self.magnet.begin_transient();
            return true;
        }
        // A pending or active drag sees the key before selections do.
        if let Some(service) = self.services.iter_mut().find(|s| s.is_busy()) {
            if service.handle_key(store, key) {
                log::debug!("Key {:?} handled by busy {}", key, service.name());
                return true;
            }
        }
        for service in self.services.iter_mut() {
            if service.handle_key(store, key) {
                log::debug!("Key {:?} handled by {}", key, service.name());
                return true;
            }
        }
        if let (Key::Named(NamedKey::Escape), Some(tool)) = (key, store.active_tool()) {
            log::debug!("Disarmed {} tool", tool.tag());
            store.set_active_tool(None);
            return true;
        }
        false
    }

    /// Releasing Ctrl restores the persistent magnet setting.
    pub fn key_up(&mut self, key: &Key) -> bool {
        if let Key::Named(NamedKey::Control) = key {
            self.magnet.end_transient();
            return true;
        }
        false
    }

    /// Highlights for painting drawing `id`.
    pub fn render_flags(&self, store: &DrawingStore, id: DrawingId) -> DrawingFlags {
        let hovered = self
            .services
            .iter()
            .find_map(|s| s.hovered().filter(|hit| hit.drawing_id == id));
        let dragged = self
            .services
            .iter()
            .find_map(|s| s.drag_handle().filter(|hit| hit.drawing_id == id));
        DrawingFlags {
            is_hovered: hovered.is_some(),
            is_selected: store.selected_drawing_id() == Some(id),
            hovered_part: hovered.and_then(|hit| hit.handle),
            selected_point_index: dragged.and_then(|hit| hit.handle),
        }
    }

    /// Drawing being placed, for rubber-band rendering.
    pub fn preview(&self, store: &DrawingStore) -> Option<Drawing> {
        self.services
            .iter()
            .find_map(|s| s.preview(store, &self.config, self.timeframe))
    }

    /// Whether any service is placing or dragging.
    pub fn is_busy(&self) -> bool {
        self.services.iter().any(|s| s.is_busy())
    }

    /// Abort every gesture in progress, reverting active drags.
    pub fn cancel(&mut self, store: &mut DrawingStore) {
        for service in self.services.iter_mut() {
            service.cancel(store);
        }
        self.pointer.release();
        self.down_point = None;
    }
}
