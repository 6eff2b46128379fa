//! Fibonacci retracement levels.

use super::{LineStyle, SerializableColor};
use serde::{Deserialize, Serialize};

/// One horizontal level of a retracement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FibLevel {
    /// Fraction of the retracement, 0.0 at the second anchor, 1.0 at the first.
    pub value: f64,
    pub label: String,
    pub color: SerializableColor,
    #[serde(default)]
    pub line_style: LineStyle,
}

impl FibLevel {
    pub fn new(value: f64, color: SerializableColor) -> Self {
        Self {
            value,
            label: format_level(value),
            color,
            line_style: LineStyle::Solid,
        }
    }

    /// Price of this level for a retracement drawn from `start` to `end`.
    pub fn price(&self, start: f64, end: f64) -> f64 {
        end - (end - start) * self.value
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && (0.0..=1.0).contains(&self.value)
    }
}

fn format_level(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() { "0".to_string() } else { text.to_string() }
}

/// The classic 0 / 23.6 / 38.2 / 50 / 61.8 / 78.6 / 100 % set.
pub fn default_fib_levels() -> Vec<FibLevel> {
    vec![
        FibLevel::new(0.0, SerializableColor::rgb(120, 123, 134)),
        FibLevel::new(0.236, SerializableColor::rgb(242, 54, 69)),
        FibLevel::new(0.382, SerializableColor::rgb(255, 152, 0)),
        FibLevel::new(0.5, SerializableColor::rgb(76, 175, 80)),
        FibLevel::new(0.618, SerializableColor::rgb(8, 153, 129)),
        FibLevel::new(0.786, SerializableColor::rgb(33, 150, 243)),
        FibLevel::new(1.0, SerializableColor::rgb(120, 123, 134)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_levels_are_ordered_and_valid() {
        let levels = default_fib_levels();
        assert_eq!(levels.len(), 7);
        assert!(levels.windows(2).all(|w| w[0].value < w[1].value));
        assert!(levels.iter().all(FibLevel::is_valid));
    }

    #[test]
    fn test_labels() {
        let levels = default_fib_levels();
        let labels: Vec<&str> = levels.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["0", "0.236", "0.382", "0.5", "0.618", "0.786", "1"]);
    }

    #[test]
    fn test_level_price() {
        let half = FibLevel::new(0.5, SerializableColor::rgb(0, 0, 0));
        assert!((half.price(100.0, 200.0) - 150.0).abs() < f64::EPSILON);
        let zero = FibLevel::new(0.0, SerializableColor::rgb(0, 0, 0));
        assert!((zero.price(100.0, 200.0) - 200.0).abs() < f64::EPSILON);
    }
}
