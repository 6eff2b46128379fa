//! Shared pointer latch for click/drag disambiguation.

use kurbo::Point;

/// Pointer state shared by every interaction service.
///
/// Owned by the drawing manager; services only read it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Whether the primary button is held.
    pub is_down: bool,
    /// Whether the current (or last) gesture moved past the drag threshold.
    /// Stays set until the next press.
    pub drag_started: bool,
    /// Host timestamp of the last accepted click, in milliseconds.
    pub last_click_time: Option<u64>,
    /// Where the current gesture started.
    pub down_position: Option<Point>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch a press.
    pub fn press(&mut self, position: Point) {
        self.is_down = true;
        self.drag_started = false;
        self.down_position = Some(position);
    }

    /// Track a move. Returns `true` on the move that starts a drag.
    pub fn track_move(&mut self, position: Point, threshold: f64) -> bool {
        if !self.is_down || self.drag_started {
            return false;
        }
        let Some(start) = self.down_position else {
            return false;
        };
        if (position - start).hypot() > threshold {
            self.drag_started = true;
            return true;
        }
        false
    }

    /// Release the button. The drag flag is kept for the click that follows.
    pub fn release(&mut self) {
        self.is_down = false;
    }

    /// Whether the gesture in progress is a drag.
    pub fn is_dragging(&self) -> bool {
        self.is_down && self.drag_started
    }

    /// Accept or discard a click delivered at `time_ms`.
    ///
    /// Clicks that end a drag and clicks within `window_ms` of the last
    /// accepted one are duplicates.
    pub fn accept_click(&mut self, time_ms: u64, window_ms: u64) -> bool {
        if self.drag_started {
            log::debug!("Discarding click that ends a drag");
            return false;
        }
        if let Some(last) = self.last_click_time {
            let elapsed = time_ms.saturating_sub(last);
            if elapsed < window_ms {
                log::debug!("Discarding duplicate click ({elapsed} ms after previous)");
                return false;
            }
        }
        self.last_click_time = Some(time_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_latches_position() {
        let mut pointer = PointerState::new();
        pointer.press(Point::new(10.0, 20.0));
        assert!(pointer.is_down);
        assert_eq!(pointer.down_position, Some(Point::new(10.0, 20.0)));
        assert!(!pointer.drag_started);
    }

    #[test]
    fn test_drag_threshold() {
        let mut pointer = PointerState::new();
        pointer.press(Point::new(0.0, 0.0));
        assert!(!pointer.track_move(Point::new(3.0, 3.0), 5.0));
        assert!(pointer.track_move(Point::new(6.0, 0.0), 5.0));
        assert!(pointer.is_dragging());
        // Only the first crossing reports the start.
        assert!(!pointer.track_move(Point::new(20.0, 0.0), 5.0));
    }

    #[test]
    fn test_move_without_press_is_not_drag() {
        let mut pointer = PointerState::new();
        assert!(!pointer.track_move(Point::new(100.0, 0.0), 5.0));
        assert!(!pointer.drag_started);
    }

    #[test]
    fn test_duplicate_click_window() {
        let mut pointer = PointerState::new();
        assert!(pointer.accept_click(1_000, 150));
        assert!(!pointer.accept_click(1_080, 150));
        assert!(pointer.accept_click(1_200, 150));
    }

    #[test]
    fn test_click_after_drag_is_discarded() {
        let mut pointer = PointerState::new();
        pointer.press(Point::ZERO);
        pointer.track_move(Point::new(50.0, 0.0), 5.0);
        pointer.release();
        assert!(!pointer.accept_click(5_000, 150));

        pointer.press(Point::ZERO);
        pointer.release();
        assert!(pointer.accept_click(6_000, 150));
    }
}
