//! Display timezone shifting.
//!
//! Stored times live in the chart's display time space, so switching the
//! display timezone moves every stored time by the difference between the
//! two zones' UTC offsets at that instant.

use crate::chart::Timestamp;
use crate::drawing::Drawing;
use crate::error::{ChartInkError, ChartInkResult};
use chrono::{DateTime, Offset, TimeZone};
use chrono_tz::Tz;

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> ChartInkResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ChartInkError::UnknownTimezone(name.to_string()))
}

/// UTC offset of `tz` at `time`, in seconds.
pub fn offset_seconds(tz: Tz, time: Timestamp) -> i64 {
    match DateTime::from_timestamp(time, 0) {
        Some(utc) => i64::from(
            tz.offset_from_utc_datetime(&utc.naive_utc())
                .fix()
                .local_minus_utc(),
        ),
        None => 0,
    }
}

/// UTC instant of a wall-clock display time in `tz`.
///
/// Ambiguous local times resolve to the earlier instant. Local times skipped
/// by a forward transition use the offset at `time` read as UTC.
pub fn to_instant(tz: Tz, time: Timestamp) -> Timestamp {
    let Some(utc) = DateTime::from_timestamp(time, 0) else {
        return time;
    };
    match tz.from_local_datetime(&utc.naive_utc()).earliest() {
        Some(local) => local.timestamp(),
        None => time - offset_seconds(tz, time),
    }
}

/// Shift a display time from one zone to another.
///
/// Both offsets are read at the same instant, so a shift followed by the
/// reverse shift restores the original time.
pub fn shift_time(time: Timestamp, from: Tz, to: Tz) -> Timestamp {
    let instant = to_instant(from, time);
    instant + offset_seconds(to, instant)
}

/// Shift every time of `drawing` into `to` and retag it.
///
/// Returns `false`, leaving the drawing untouched, when its current tag is
/// not a known timezone.
pub fn shift_drawing(drawing: &mut Drawing, to_name: &str, to: Tz) -> bool {
    let from = match parse_timezone(&drawing.timezone) {
        Ok(from) => from,
        Err(err) => {
            log::warn!("Skipping drawing {} during timezone switch: {}", drawing.id(), err);
            return false;
        }
    };
    if from != to {
        drawing.shape.for_each_time_mut(|t| *t = shift_time(*t, from, to));
    }
    drawing.timezone = to_name.to_string();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{DrawingPoint, DrawingShape, DrawingStyle};

    // 2024-07-01T12:00:00Z
    const SUMMER: Timestamp = 1_719_835_200;
    // 2024-01-15T12:00:00Z
    const WINTER: Timestamp = 1_705_320_000;

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Europe/Berlin").is_ok());
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(ChartInkError::UnknownTimezone(name)) if name == "Mars/Olympus"
        ));
    }

    #[test]
    fn test_offsets_follow_dst() {
        let ny = parse_timezone("America/New_York").unwrap();
        assert_eq!(offset_seconds(ny, SUMMER), -4 * 3600);
        assert_eq!(offset_seconds(ny, WINTER), -5 * 3600);
        assert_eq!(offset_seconds(Tz::UTC, SUMMER), 0);
    }

    #[test]
    fn test_shift_round_trip() {
        let tokyo = parse_timezone("Asia/Tokyo").unwrap();
        let berlin = parse_timezone("Europe/Berlin").unwrap();
        for t in [SUMMER, WINTER] {
            let there = shift_time(t, tokyo, berlin);
            let back = shift_time(there, berlin, tokyo);
            assert!((back - t).abs() <= 1);
        }
    }

    #[test]
    fn test_round_trip_at_dst_edges() {
        let ny = parse_timezone("America/New_York").unwrap();
        // Around the 2024 spring (07:00Z) and autumn (06:00Z) transitions.
        for t in [
            1_710_052_200,
            1_710_054_000,
            1_710_055_800,
            1_730_611_800,
            1_730_619_000,
        ] {
            let local = shift_time(t, Tz::UTC, ny);
            assert_eq!(shift_time(local, ny, Tz::UTC), t, "at {t}");
        }
        // 03:30 local on the spring-forward day is 07:30 UTC.
        assert_eq!(to_instant(ny, 1_710_041_400), 1_710_055_800);
    }

    #[test]
    fn test_shift_drawing_retags() {
        let mut drawing = Drawing::new(
            DrawingShape::Trendline {
                points: [DrawingPoint::new(SUMMER, 1.0), DrawingPoint::new(WINTER, 2.0)],
            },
            DrawingStyle::default(),
            "UTC",
        );
        let ny = parse_timezone("America/New_York").unwrap();
        assert!(shift_drawing(&mut drawing, "America/New_York", ny));
        assert_eq!(drawing.timezone, "America/New_York");
        let [a, b] = drawing.shape.two_points().unwrap();
        assert_eq!(a.time, SUMMER - 4 * 3600);
        assert_eq!(b.time, WINTER - 5 * 3600);
    }

    #[test]
    fn test_unknown_tag_is_skipped() {
        let mut drawing = Drawing::new(
            DrawingShape::Vertical { time: SUMMER },
            DrawingStyle::default(),
            "Nowhere",
        );
        assert!(!shift_drawing(&mut drawing, "UTC", Tz::UTC));
        assert_eq!(drawing.timezone, "Nowhere");
        assert_eq!(drawing.shape, DrawingShape::Vertical { time: SUMMER });
    }
}
