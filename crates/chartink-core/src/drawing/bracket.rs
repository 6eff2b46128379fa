//! Long/short position brackets.

use super::{DrawingPoint, SerializableColor};
use crate::chart::Timestamp;
use serde::{Deserialize, Serialize};

/// Direction of a position bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1 when profit lies above entry, -1 when it lies below.
    pub fn sign(self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }
}

/// Entry, stop and profit levels spanning a time range.
///
/// In canonical form the stop and profit points share the entry's time; the
/// optional end point only contributes its time (the right edge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub entry_point: DrawingPoint,
    pub stop_point: DrawingPoint,
    pub profit_point: DrawingPoint,
    #[serde(default)]
    pub end_point: Option<DrawingPoint>,
    pub profit_color: SerializableColor,
    pub stop_color: SerializableColor,
    pub line_color: SerializableColor,
    pub line_width: f64,
}

impl Bracket {
    /// Zone fill for the profit side.
    pub const DEFAULT_PROFIT_COLOR: SerializableColor = SerializableColor::new(8, 153, 129, 64);
    /// Zone fill for the stop side.
    pub const DEFAULT_STOP_COLOR: SerializableColor = SerializableColor::new(242, 54, 69, 64);
    /// Entry line color.
    pub const DEFAULT_LINE_COLOR: SerializableColor = SerializableColor::rgb(120, 123, 134);

    /// Create a bracket with stop and profit `distance` price units away from entry.
    pub fn new(
        side: PositionSide,
        entry: DrawingPoint,
        distance: f64,
        end_time: Option<Timestamp>,
    ) -> Self {
        let sign = side.sign();
        Self {
            entry_point: entry,
            stop_point: DrawingPoint::new(entry.time, entry.price - sign * distance),
            profit_point: DrawingPoint::new(entry.time, entry.price + sign * distance),
            end_point: end_time.map(|t| DrawingPoint::new(t, entry.price)),
            profit_color: Self::DEFAULT_PROFIT_COLOR,
            stop_color: Self::DEFAULT_STOP_COLOR,
            line_color: Self::DEFAULT_LINE_COLOR,
            line_width: 1.0,
        }
    }

    /// Time of the right edge; the entry time when no end point is set.
    pub fn right_time(&self) -> Timestamp {
        self.end_point.map_or(self.entry_point.time, |p| p.time)
    }

    /// Move the left edge, keeping stop and profit aligned with entry.
    pub fn set_entry_time(&mut self, time: Timestamp) {
        self.entry_point.time = time;
        self.stop_point.time = time;
        self.profit_point.time = time;
    }

    /// Stop price limited to its side of the entry.
    pub fn clamp_stop(&self, side: PositionSide, price: f64) -> f64 {
        match side {
            PositionSide::Long => price.min(self.entry_point.price),
            PositionSide::Short => price.max(self.entry_point.price),
        }
    }

    /// Profit price limited to its side of the entry.
    pub fn clamp_profit(&self, side: PositionSide, price: f64) -> f64 {
        match side {
            PositionSide::Long => price.max(self.entry_point.price),
            PositionSide::Short => price.min(self.entry_point.price),
        }
    }

    /// Entry price limited to the band between stop and profit.
    pub fn clamp_entry(&self, price: f64) -> f64 {
        let lo = self.stop_point.price.min(self.profit_point.price);
        let hi = self.stop_point.price.max(self.profit_point.price);
        price.clamp(lo, hi)
    }

    /// Entry time that does not pass the right edge.
    pub fn clamp_entry_time(&self, time: Timestamp) -> Timestamp {
        match self.end_point {
            Some(end) => time.min(end.time),
            None => time,
        }
    }

    /// Right-edge time that does not precede the entry.
    pub fn clamp_end_time(&self, time: Timestamp) -> Timestamp {
        time.max(self.entry_point.time)
    }

    /// Reward divided by risk, `None` for a zero-risk bracket.
    pub fn risk_reward(&self) -> Option<f64> {
        let risk = (self.entry_point.price - self.stop_point.price).abs();
        if risk < f64::EPSILON {
            return None;
        }
        Some((self.profit_point.price - self.entry_point.price).abs() / risk)
    }
}
