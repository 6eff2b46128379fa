//! Host chart interfaces.
//!
//! The charting engine that paints candles and owns the axes is an external
//! collaborator. The engine only reaches it through these traits.

use serde::{Deserialize, Serialize};

/// UNIX seconds in the chart's display time space.
pub type Timestamp = i64;

/// One OHLC sample of the chart's data series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(time: Timestamp, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }
}

/// Horizontal axis mapping of the host chart.
pub trait TimeScale {
    /// X coordinate of a sample time. `None` for times that are not samples.
    fn time_to_coordinate(&self, time: Timestamp) -> Option<f64>;

    /// Sample time under an x coordinate.
    fn coordinate_to_time(&self, x: f64) -> Option<Timestamp>;

    /// Fractional logical (bar) index under an x coordinate.
    fn coordinate_to_logical(&self, x: f64) -> Option<f64>;

    /// X coordinate of a logical index.
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64>;
}

/// Vertical axis mapping of the host chart's main series.
pub trait PriceScale {
    fn price_to_coordinate(&self, price: f64) -> Option<f64>;

    fn coordinate_to_price(&self, y: f64) -> Option<f64>;
}

/// Everything the engine needs from the host chart for one event.
pub trait ChartHost {
    fn time_scale(&self) -> &dyn TimeScale;

    /// The main price series, if one is attached.
    fn series(&self) -> Option<&dyn PriceScale>;

    /// Current data array, sorted by time.
    fn samples(&self) -> &[Candle];

    /// Move the visual crosshair, used while magnet snapping is active.
    fn set_crosshair_position(&mut self, price: f64, time: Timestamp);
}
