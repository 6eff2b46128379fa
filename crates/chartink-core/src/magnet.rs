//! Magnet mode: snapping prices to the OHLC values of the sample under the cursor.

use crate::bridge::CoordinateBridge;
use crate::chart::Candle;
use crate::drawing::DrawingPoint;

/// Which OHLC value a price snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OhlcField {
    Open,
    High,
    Low,
    Close,
}

impl OhlcField {
    pub fn value(self, candle: &Candle) -> f64 {
        match self {
            OhlcField::Open => candle.open,
            OhlcField::High => candle.high,
            OhlcField::Low => candle.low,
            OhlcField::Close => candle.close,
        }
    }
}

/// Result of a magnet resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetResult {
    /// The resolved point.
    pub point: DrawingPoint,
    /// The OHLC field the price snapped to, if any.
    pub snapped: Option<OhlcField>,
}

impl MagnetResult {
    /// Create a result with no snapping.
    pub fn none(point: DrawingPoint) -> Self {
        Self {
            point,
            snapped: None,
        }
    }

    pub fn is_snapped(&self) -> bool {
        self.snapped.is_some()
    }
}

/// Persistent magnet toggle plus the transient Ctrl override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MagnetResolver {
    persistent: bool,
    transient: bool,
}

impl MagnetResolver {
    pub fn new(enabled: bool) -> Self {
        Self {
            persistent: enabled,
            transient: false,
        }
    }

    /// Whether snapping currently applies.
    pub fn is_enabled(&self) -> bool {
        self.persistent || self.transient
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.persistent = enabled;
    }

    /// Flip the persistent toggle.
    pub fn toggle(&mut self) {
        self.persistent = !self.persistent;
    }

    /// Force snapping on until [`end_transient`](Self::end_transient).
    pub fn begin_transient(&mut self) {
        self.transient = true;
    }

    /// Drop the override; the persistent toggle applies again.
    pub fn end_transient(&mut self) {
        self.transient = false;
    }

    /// Snap `raw` to the closest OHLC value of its nearest sample.
    ///
    /// Identity when magnet is off, no drawing context is active, or the
    /// time lies outside the data.
    pub fn resolve(
        &self,
        bridge: &CoordinateBridge<'_>,
        raw: DrawingPoint,
        context_active: bool,
    ) -> MagnetResult {
        if !self.is_enabled() || !context_active {
            return MagnetResult::none(raw);
        }
        let Some(candle) = bridge.nearest_sample(raw.time) else {
            return MagnetResult::none(raw);
        };
        match closest_field(candle, raw.price) {
            Some((field, price)) => MagnetResult {
                point: DrawingPoint::new(raw.time, price),
                snapped: Some(field),
            },
            None => MagnetResult::none(raw),
        }
    }
}

/// Closest OHLC value to `price`; ties go to the earlier field.
fn closest_field(candle: &Candle, price: f64) -> Option<(OhlcField, f64)> {
    [OhlcField::Open, OhlcField::High, OhlcField::Low, OhlcField::Close]
        .into_iter()
        .map(|field| (field, field.value(candle)))
        .filter(|(_, value)| value.is_finite())
        .fold(None, |best: Option<(OhlcField, f64)>, (field, value)| match best {
            Some((_, b)) if (b - price).abs() <= (value - price).abs() => best,
            _ => Some((field, value)),
        })
}
