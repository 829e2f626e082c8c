use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{BarSeries, ExtremumKind};

pub const DEFAULT_SWING_RADIUS: usize = 5;
pub const DEFAULT_FRACTAL_RADIUS: usize = 2;

/// A local high/low used for market structure and stop placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub kind: ExtremumKind,
}

/// Bill Williams fractal; drives take-profit search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub kind: ExtremumKind,
}

impl From<SwingPoint> for Fractal {
    fn from(p: SwingPoint) -> Self {
        Fractal {
            index: p.index,
            timestamp: p.timestamp,
            price: p.price,
            kind: p.kind,
        }
    }
}

/// Find every bar that is the extreme of its `[i - radius, i + radius]` window.
///
/// Bars closer than `radius` to either end of the series are never reported.
/// Ties are kept: each tying bar is tested against its own window, so a flat
/// top can yield several adjacent highs. Highs and lows are returned in time
/// order.
pub fn find_extrema(
    bars: &BarSeries,
    radius: usize,
) -> CoreResult<(Vec<SwingPoint>, Vec<SwingPoint>)> {
    if radius == 0 {
        return Err(CoreError::InvalidRadius);
    }
    let len = bars.len();
    let required = 2 * radius + 1;
    if len < required {
        return Err(CoreError::InsufficientData {
            required,
            actual: len,
        });
    }

    let mut highs = Vec::new();
    let mut lows = Vec::new();

    for i in radius..(len - radius) {
        let window = bars.window(i - radius, i + radius + 1);
        let bar = &bars[i];

        if bar.high >= window.highs_max() {
            highs.push(SwingPoint {
                index: i,
                timestamp: bar.timestamp,
                price: bar.high,
                kind: ExtremumKind::High,
            });
        }

        if bar.low <= window.lows_min() {
            lows.push(SwingPoint {
                index: i,
                timestamp: bar.timestamp,
                price: bar.low,
                kind: ExtremumKind::Low,
            });
        }
    }

    Ok((highs, lows))
}

#[derive(Debug, Clone, Copy)]
pub struct SwingDetector {
    pub radius: usize,
}

impl Default for SwingDetector {
    fn default() -> Self {
        Self::with_radius(DEFAULT_SWING_RADIUS)
    }
}

impl SwingDetector {
    pub fn with_radius(radius: usize) -> Self {
        Self { radius }
    }

    pub fn detect(&self, bars: &BarSeries) -> CoreResult<(Vec<SwingPoint>, Vec<SwingPoint>)> {
        find_extrema(bars, self.radius)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FractalDetector {
    pub radius: usize,
}

impl Default for FractalDetector {
    fn default() -> Self {
        Self::with_radius(DEFAULT_FRACTAL_RADIUS)
    }
}

impl FractalDetector {
    pub fn with_radius(radius: usize) -> Self {
        Self { radius }
    }

    pub fn detect(&self, bars: &BarSeries) -> CoreResult<(Vec<Fractal>, Vec<Fractal>)> {
        let (highs, lows) = find_extrema(bars, self.radius)?;
        Ok((
            highs.into_iter().map(Fractal::from).collect(),
            lows.into_iter().map(Fractal::from).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_hl_bars, make_zigzag};

    #[test]
    fn single_peak_in_eleven_bars() {
        let hl: Vec<(f64, f64)> = (0..11)
            .map(|i| {
                let h = if i == 5 { 120.0 } else { 100.0 + i as f64 };
                (h, 90.0 - i as f64)
            })
            .collect();
        let bars = make_hl_bars(&hl);
        let (highs, _) = find_extrema(&bars, 5).unwrap();
        assert_eq!(highs.len(), 1);
        assert_eq!(highs[0].index, 5);
        assert!((highs[0].price - 120.0).abs() < 1e-9);
        assert_eq!(highs[0].kind, ExtremumKind::High);
        assert_eq!(highs[0].timestamp, bars[5].timestamp);
    }

    #[test]
    fn too_few_bars_is_insufficient_data() {
        let bars = make_hl_bars(&[(2.0, 1.0); 10]);
        assert_eq!(
            find_extrema(&bars, 5),
            Err(CoreError::InsufficientData {
                required: 11,
                actual: 10
            })
        );
    }

    #[test]
    fn zero_radius_is_rejected() {
        let bars = make_hl_bars(&[(2.0, 1.0); 3]);
        assert_eq!(find_extrema(&bars, 0), Err(CoreError::InvalidRadius));
    }

    #[test]
    fn edges_are_never_reported() {
        // Global extremes sit at both ends; they must be ignored.
        let bars = make_zigzag(&[200.0, 100.0, 150.0, 50.0], 4);
        let len = bars.len();
        for r in 1..=4 {
            let (highs, lows) = find_extrema(&bars, r).unwrap();
            for p in highs.iter().chain(lows.iter()) {
                assert!(p.index >= r && p.index <= len - 1 - r, "r={} idx={}", r, p.index);
            }
        }
    }

    #[test]
    fn ties_produce_adjacent_extrema() {
        let bars = make_hl_bars(&[
            (10.0, 5.0),
            (11.0, 5.0),
            (15.0, 6.0),
            (15.0, 6.0),
            (11.0, 5.0),
            (10.0, 5.0),
        ]);
        let (highs, _) = find_extrema(&bars, 2).unwrap();
        let idx: Vec<usize> = highs.iter().map(|p| p.index).collect();
        assert_eq!(idx, vec![2, 3]);
    }

    #[test]
    fn detection_is_deterministic() {
        let bars = make_zigzag(&[100.0, 120.0, 110.0, 130.0, 115.0, 140.0], 6);
        let a = find_extrema(&bars, 3).unwrap();
        let b = find_extrema(&bars, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zigzag_pivots_are_found_in_time_order() {
        let bars = make_zigzag(&[100.0, 120.0, 110.0, 130.0, 115.0, 140.0], 6);
        let (highs, lows) = SwingDetector::default().detect(&bars).unwrap();
        let h: Vec<usize> = highs.iter().map(|p| p.index).collect();
        let l: Vec<usize> = lows.iter().map(|p| p.index).collect();
        assert_eq!(h, vec![6, 18]);
        assert_eq!(l, vec![12, 24]);
    }

    #[test]
    fn fractals_share_the_engine() {
        let bars = make_zigzag(&[100.0, 120.0, 110.0, 130.0, 115.0, 140.0], 6);
        let (swing_highs, swing_lows) = find_extrema(&bars, 2).unwrap();
        let (fr_highs, fr_lows) = FractalDetector::default().detect(&bars).unwrap();
        assert_eq!(fr_highs.len(), swing_highs.len());
        assert_eq!(fr_lows.len(), swing_lows.len());
        assert!(fr_highs
            .iter()
            .zip(&swing_highs)
            .all(|(f, s)| f.index == s.index && f.price == s.price));
    }
}
