use chrono::{DateTime, Duration, Utc};
use daily_swing_bot::models::{Bar, BarSeries};

pub fn monday() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Hourly zigzag through `pivots` starting at `base`, `leg` bars per leg.
/// Each bar spans +/-0.5 around the path.
pub fn make_zigzag(base: DateTime<Utc>, pivots: &[f64], leg: usize) -> BarSeries {
    let mut path = Vec::new();
    for pair in pivots.windows(2) {
        for step in 0..leg {
            path.push(pair[0] + (pair[1] - pair[0]) * step as f64 / leg as f64);
        }
    }
    if let Some(&last) = pivots.last() {
        path.push(last);
    }

    let bars: Vec<Bar> = path
        .iter()
        .enumerate()
        .map(|(i, &p)| Bar {
            timestamp: base + Duration::hours(i as i64),
            open: p,
            high: p + 0.5,
            low: p - 0.5,
            close: p,
            volume: 100,
        })
        .collect();

    BarSeries::new(bars).unwrap()
}

pub fn bullish_h1() -> BarSeries {
    make_zigzag(monday(), &[100.0, 120.0, 110.0, 130.0, 115.0, 140.0], 6)
}

pub fn bearish_h1() -> BarSeries {
    make_zigzag(monday(), &[140.0, 120.0, 130.0, 110.0, 125.0, 100.0], 6)
}

/// Three days of steadily rising swings; the structure is first readable at
/// the third midnight.
pub fn rising_waves() -> BarSeries {
    make_zigzag(
        monday(),
        &[
            100.0, 120.0, 110.0, 130.0, 120.0, 140.0, 130.0, 150.0, 140.0, 160.0, 150.0, 170.0,
        ],
        6,
    )
}
