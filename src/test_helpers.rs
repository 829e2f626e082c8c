use chrono::{DateTime, Duration, Utc};

use crate::config::{Config, MinLotPolicy, SessionTime};
use crate::models::{Bar, BarSeries};

/// Monday 2024-01-15 00:00 UTC, the start of every synthetic series.
pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Create hourly bars from (open, high, low, close) tuples.
pub fn make_bars(data: &[(f64, f64, f64, f64)]) -> BarSeries {
    let base = base_time();
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Bar {
            timestamp: base + Duration::hours(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 100,
        })
        .collect();

    BarSeries::new(bars).unwrap()
}

/// Hourly bars whose high/low are given directly; open/close sit at the midpoint.
pub fn make_hl_bars(data: &[(f64, f64)]) -> BarSeries {
    let ohlc: Vec<(f64, f64, f64, f64)> = data
        .iter()
        .map(|&(h, l)| {
            let mid = (h + l) / 2.0;
            (mid, h, l, mid)
        })
        .collect();
    make_bars(&ohlc)
}

/// Piecewise-linear path through `pivots`, `leg` bars per leg.
///
/// Each bar spans +/-0.5 around the path value, so every pivot is a strict
/// local extreme for any radius below `leg`.
pub fn make_zigzag(pivots: &[f64], leg: usize) -> BarSeries {
    let mut closes = Vec::new();
    for pair in pivots.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        for step in 0..leg {
            closes.push(from + (to - from) * step as f64 / leg as f64);
        }
    }
    if let Some(&last) = pivots.last() {
        closes.push(last);
    }
    let hl: Vec<(f64, f64)> = closes.iter().map(|&c| (c + 0.5, c - 0.5)).collect();
    make_hl_bars(&hl)
}

/// Bullish H1 structure: higher highs and higher lows, ending on a rally.
pub fn bullish_structure() -> BarSeries {
    make_zigzag(&[100.0, 120.0, 110.0, 130.0, 115.0, 140.0], 6)
}

/// Bearish H1 structure: lower highs and lower lows, ending on a sell-off.
pub fn bearish_structure() -> BarSeries {
    make_zigzag(&[140.0, 120.0, 130.0, 110.0, 125.0, 100.0], 6)
}

pub fn default_test_config() -> Config {
    Config {
        symbol: "GER40".to_string(),
        swing_radius_h1: 5,
        swing_radius_h4: 3,
        fractal_radius: 2,
        sl_offset_points: 2.0,
        risk_percent: 1.0,
        point_value: 1.0,
        entry_session: SessionTime {
            start: (0, 0),
            end: (1, 0),
        },
        min_lot_policy: MinLotPolicy::Floor,
        tp_fallback_rr: None,
        history_h1: 150,
        history_h4: 100,
        check_interval_secs: 300,
        initial_balance: 10_000.0,
        log_level: "ERROR".to_string(),
    }
}
