//! Coordinate bridge between domain space (time, price) and screen pixels.
//!
//! Every projection of a stored time goes through [`CoordinateBridge::time_to_x`],
//! which snaps the time to the nearest sample first. Rendering and
//! hit-testing both project through it, so a drawing is always hit where it
//! is painted.

use crate::chart::{Candle, ChartHost, PriceScale, TimeScale, Timestamp};
use crate::drawing::DrawingPoint;
use kurbo::Point;

/// Stateless converter over the host chart's axes and current data.
#[derive(Clone, Copy)]
pub struct CoordinateBridge<'a> {
    time_scale: &'a dyn TimeScale,
    series: Option<&'a dyn PriceScale>,
    samples: &'a [Candle],
}

impl<'a> CoordinateBridge<'a> {
    pub fn new(
        time_scale: &'a dyn TimeScale,
        series: Option<&'a dyn PriceScale>,
        samples: &'a [Candle],
    ) -> Self {
        Self {
            time_scale,
            series,
            samples,
        }
    }

    /// Bridge over a host chart's current state.
    pub fn from_host<H: ChartHost + ?Sized>(host: &'a H) -> Self {
        Self::new(host.time_scale(), host.series(), host.samples())
    }

    pub fn samples(&self) -> &'a [Candle] {
        self.samples
    }

    /// Bar interval at the left or right data edge.
    fn edge_interval(&self, right: bool) -> Option<f64> {
        let n = self.samples.len();
        if n < 2 {
            return None;
        }
        let interval = if right {
            self.samples[n - 1].time - self.samples[n - 2].time
        } else {
            self.samples[1].time - self.samples[0].time
        };
        (interval > 0).then_some(interval as f64)
    }

    /// Fractional logical index of a time.
    ///
    /// Interpolates between neighbouring samples and extrapolates past either
    /// edge using that edge's bar interval.
    pub fn logical_index(&self, time: Timestamp) -> Option<f64> {
        let n = self.samples.len();
        match self.samples.binary_search_by_key(&time, |c| c.time) {
            Ok(i) => Some(i as f64),
            Err(_) if n < 2 => None,
            Err(0) => {
                let interval = self.edge_interval(false)?;
                Some((time - self.samples[0].time) as f64 / interval)
            }
            Err(i) if i == n => {
                let interval = self.edge_interval(true)?;
                Some((n - 1) as f64 + (time - self.samples[n - 1].time) as f64 / interval)
            }
            Err(i) => {
                let (t0, t1) = (self.samples[i - 1].time, self.samples[i].time);
                Some((i - 1) as f64 + (time - t0) as f64 / (t1 - t0) as f64)
            }
        }
    }

    /// Index of the sample nearest to a time, `None` outside the data range.
    pub fn nearest_sample_index(&self, time: Timestamp) -> Option<usize> {
        let logical = self.logical_index(time)?.round();
        if logical < 0.0 || logical >= self.samples.len() as f64 {
            return None;
        }
        Some(logical as usize)
    }

    /// Time of the sample nearest to `time`, `None` outside the data range.
    pub fn nearest_sample_time(&self, time: Timestamp) -> Option<Timestamp> {
        self.nearest_sample_index(time).map(|i| self.samples[i].time)
    }

    /// Sample nearest to a time.
    pub fn nearest_sample(&self, time: Timestamp) -> Option<&'a Candle> {
        self.nearest_sample_index(time).map(|i| &self.samples[i])
    }

    /// Time of a whole logical index, extrapolated past the data edges.
    fn time_at_logical(&self, logical: f64) -> Option<Timestamp> {
        let n = self.samples.len();
        if n == 0 || !logical.is_finite() {
            return None;
        }
        if logical < 0.0 {
            let interval = self.edge_interval(false)?;
            return Some(self.samples[0].time + (logical * interval).round() as Timestamp);
        }
        let last = (n - 1) as f64;
        if logical > last {
            let interval = self.edge_interval(true)?;
            let offset = ((logical - last) * interval).round() as Timestamp;
            return Some(self.samples[n - 1].time + offset);
        }
        Some(self.samples[logical as usize].time)
    }

    /// Snapped x coordinate of a stored time.
    ///
    /// Inside the data range the time snaps to its nearest sample; outside it
    /// snaps to the nearest whole bar of the extrapolated grid.
    pub fn time_to_x(&self, time: Timestamp) -> Option<f64> {
        match self.nearest_sample_time(time) {
            Some(snapped) => self.time_scale.time_to_coordinate(snapped),
            None => {
                let logical = self.logical_index(time)?.round();
                self.time_scale.logical_to_coordinate(logical)
            }
        }
    }

    /// Time under an x coordinate, extrapolated past the data edges.
    pub fn x_to_time(&self, x: f64) -> Option<Timestamp> {
        if let Some(time) = self.time_scale.coordinate_to_time(x) {
            return Some(time);
        }
        let logical = self.time_scale.coordinate_to_logical(x)?.round();
        self.time_at_logical(logical)
    }

    pub fn price_to_y(&self, price: f64) -> Option<f64> {
        self.series?.price_to_coordinate(price)
    }

    pub fn y_to_price(&self, y: f64) -> Option<f64> {
        self.series?.coordinate_to_price(y)
    }

    /// Pixel position of a domain point.
    pub fn domain_to_pixel(&self, point: DrawingPoint) -> Option<Point> {
        let x = self.time_to_x(point.time)?;
        let y = self.price_to_y(point.price)?;
        Some(Point::new(x, y))
    }

    /// Domain point under a pixel position.
    pub fn pixel_to_domain(&self, x: f64, y: f64) -> Option<DrawingPoint> {
        let time = self.x_to_time(x)?;
        let price = self.y_to_price(y)?;
        Some(DrawingPoint::new(time, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::fixtures::minute_viewport;

    #[test]
    fn test_logical_index_interpolates() {
        let vp = minute_viewport();
        let bridge = CoordinateBridge::from_host(&vp);
        assert!((bridge.logical_index(90).unwrap() - 1.5).abs() < 1e-12);
        assert!((bridge.logical_index(120).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_logical_index_extrapolates() {
        let vp = minute_viewport();
        let bridge = CoordinateBridge::from_host(&vp);
        assert!((bridge.logical_index(99 * 60 + 120).unwrap() - 101.0).abs() < 1e-12);
        assert!((bridge.logical_index(-60).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_sample_time() {
        let vp = minute_viewport();
        let bridge = CoordinateBridge::from_host(&vp);
        assert_eq!(bridge.nearest_sample_time(95), Some(120));
        assert_eq!(bridge.nearest_sample_time(80), Some(60));
        assert_eq!(bridge.nearest_sample_time(99 * 60 + 20), Some(99 * 60));
        assert_eq!(bridge.nearest_sample_time(99 * 60 + 50), None);
        assert_eq!(bridge.nearest_sample_time(-100), None);
    }

    #[test]
    fn test_empty_data() {
        let mut vp = minute_viewport();
        vp.set_samples(Vec::new());
        let bridge = CoordinateBridge::from_host(&vp);
        assert_eq!(bridge.nearest_sample_time(0), None);
        assert_eq!(bridge.domain_to_pixel(DrawingPoint::new(0, 10.0)), None);
    }

    #[test]
    fn test_time_to_x_snaps() {
        let vp = minute_viewport();
        let bridge = CoordinateBridge::from_host(&vp);
        // 1000 s lies between bars 16 (960) and 17 (1020); nearest is 17.
        assert!((bridge.time_to_x(1000).unwrap() - 170.0).abs() < 1e-9);
        assert!((bridge.time_to_x(1020).unwrap() - 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_to_x_past_data_uses_bar_grid() {
        let vp = minute_viewport();
        let bridge = CoordinateBridge::from_host(&vp);
        let future = 99 * 60 + 50 * 60 + 10;
        assert!((bridge.time_to_x(future).unwrap() - 1490.0).abs() < 1e-9);
        assert_eq!(bridge.x_to_time(1490.0), Some(99 * 60 + 50 * 60));
    }

    #[test]
    fn test_pixel_roundtrip() {
        let vp = minute_viewport();
        let bridge = CoordinateBridge::from_host(&vp);
        let point = bridge.pixel_to_domain(200.0, 250.0).unwrap();
        assert_eq!(point.time, 1200);
        assert!((point.price - 100.0).abs() < 1e-9);
        let pixel = bridge.domain_to_pixel(point).unwrap();
        assert!((pixel.x - 200.0).abs() < 1e-9);
        assert!((pixel.y - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_series() {
        let mut vp = minute_viewport();
        vp.set_has_series(false);
        let bridge = CoordinateBridge::from_host(&vp);
        assert!(bridge.pixel_to_domain(10.0, 10.0).is_none());
        assert!(bridge.domain_to_pixel(DrawingPoint::new(60, 10.0)).is_none());
    }
}
