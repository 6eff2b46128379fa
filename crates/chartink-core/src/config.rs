//! Interaction tuning knobs.

use crate::error::{ChartInkError, ChartInkResult};
use serde::{Deserialize, Serialize};

/// Hit radius for point handles, in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;
/// Hit distance for lines, in screen pixels.
pub const LINE_HIT_TOLERANCE: f64 = 6.0;
/// Hit distance for area borders and edges, in screen pixels.
pub const EDGE_HIT_TOLERANCE: f64 = 8.0;
/// Pointer travel that turns a press into a drag.
pub const DRAG_THRESHOLD: f64 = 5.0;
/// Clicks closer together than this are treated as duplicates.
pub const DUPLICATE_CLICK_MS: u64 = 150;

/// Configuration shared by the manager and every interaction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub handle_tolerance: f64,
    pub line_tolerance: f64,
    pub edge_tolerance: f64,
    pub drag_threshold: f64,
    pub duplicate_click_ms: u64,
    /// Price distance from entry to the default stop and profit levels.
    pub bracket_default_distance: f64,
    /// Width of a new bracket, in bars of the current timeframe.
    pub bracket_default_bars: i64,
    /// Timezone tag given to drawings when the store has none configured.
    pub default_timezone: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            handle_tolerance: HANDLE_HIT_TOLERANCE,
            line_tolerance: LINE_HIT_TOLERANCE,
            edge_tolerance: EDGE_HIT_TOLERANCE,
            drag_threshold: DRAG_THRESHOLD,
            duplicate_click_ms: DUPLICATE_CLICK_MS,
            bracket_default_distance: 20.0,
            bracket_default_bars: 50,
            default_timezone: "UTC".to_string(),
        }
    }
}

impl InteractionConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ChartInkResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> ChartInkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tolerances that would make hit-testing meaningless.
    pub fn validate(&self) -> ChartInkResult<()> {
        let tolerances = [
            ("handle_tolerance", self.handle_tolerance),
            ("line_tolerance", self.line_tolerance),
            ("edge_tolerance", self.edge_tolerance),
            ("drag_threshold", self.drag_threshold),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartInkError::Config(format!("{name} must be a non-negative number")));
            }
        }
        if self.bracket_default_bars <= 0 {
            return Err(ChartInkError::Config("bracket_default_bars must be positive".into()));
        }
        Ok(())
    }
}
