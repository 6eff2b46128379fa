//! Linear chart viewport.
//!
//! A self-contained implementation of the host chart traits: bars are laid
//! out at a fixed spacing along x and prices map linearly onto y. Hosts with
//! their own axis model implement [`ChartHost`] directly instead.

use crate::chart::{Candle, ChartHost, PriceScale, TimeScale, Timestamp};

/// Viewport over a candle series.
#[derive(Debug, Clone)]
pub struct ChartViewport {
    /// Horizontal distance between bar centers, in pixels.
    pub bar_spacing: f64,
    /// Logical index whose bar center sits at x = 0.
    pub first_logical: f64,
    /// Pane width in pixels.
    pub width: f64,
    /// Pane height in pixels.
    pub height: f64,
    /// Price at y = 0.
    pub price_top: f64,
    /// Price at y = height.
    pub price_bottom: f64,
    /// Whether a price series is attached.
    has_series: bool,
    samples: Vec<Candle>,
    crosshair: Option<(f64, Timestamp)>,
}

impl Default for ChartViewport {
    fn default() -> Self {
        Self {
            bar_spacing: 10.0,
            first_logical: 0.0,
            width: 800.0,
            height: 600.0,
            price_top: 100.0,
            price_bottom: 0.0,
            has_series: true,
            samples: Vec::new(),
            crosshair: None,
        }
    }
}

impl ChartViewport {
    /// Create a viewport over `samples` with the given pane size and price range.
    pub fn new(samples: Vec<Candle>, width: f64, height: f64, price_range: (f64, f64)) -> Self {
        Self {
            width,
            height,
            price_bottom: price_range.0,
            price_top: price_range.1,
            samples,
            ..Self::default()
        }
    }

    /// Replace the data series.
    pub fn set_samples(&mut self, samples: Vec<Candle>) {
        self.samples = samples;
    }

    /// Attach or detach the price series.
    pub fn set_has_series(&mut self, has_series: bool) {
        self.has_series = has_series;
    }

    /// Last crosshair position requested by the engine.
    pub fn crosshair(&self) -> Option<(f64, Timestamp)> {
        self.crosshair
    }

    fn sample_index(&self, time: Timestamp) -> Option<usize> {
        self.samples.binary_search_by_key(&time, |c| c.time).ok()
    }
}

impl TimeScale for ChartViewport {
    fn time_to_coordinate(&self, time: Timestamp) -> Option<f64> {
        let index = self.sample_index(time)?;
        self.logical_to_coordinate(index as f64)
    }

    fn coordinate_to_time(&self, x: f64) -> Option<Timestamp> {
        let logical = self.coordinate_to_logical(x)?.round();
        if logical < 0.0 {
            return None;
        }
        self.samples.get(logical as usize).map(|c| c.time)
    }

    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        if !x.is_finite() || self.bar_spacing <= 0.0 {
            return None;
        }
        Some(self.first_logical + x / self.bar_spacing)
    }

    fn logical_to_coordinate(&self, logical: f64) -> Option<f64> {
        if !logical.is_finite() {
            return None;
        }
        Some((logical - self.first_logical) * self.bar_spacing)
    }
}

impl PriceScale for ChartViewport {
    fn price_to_coordinate(&self, price: f64) -> Option<f64> {
        let range = self.price_top - self.price_bottom;
        if range.abs() < f64::EPSILON || !price.is_finite() {
            return None;
        }
        Some((self.price_top - price) / range * self.height)
    }

    fn coordinate_to_price(&self, y: f64) -> Option<f64> {
        let range = self.price_top - self.price_bottom;
        if range.abs() < f64::EPSILON || self.height <= 0.0 || !y.is_finite() {
            return None;
        }
        Some(self.price_top - y / self.height * range)
    }
}

impl ChartHost for ChartViewport {
    fn time_scale(&self) -> &dyn TimeScale {
        self
    }

    fn series(&self) -> Option<&dyn PriceScale> {
        if self.has_series { Some(self) } else { None }
    }

    fn samples(&self) -> &[Candle] {
        &self.samples
    }

    fn set_crosshair_position(&mut self, price: f64, time: Timestamp) {
        self.crosshair = Some((price, time));
    }
}
