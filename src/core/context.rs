use crate::core::extrema::{SwingDetector, SwingPoint};
use crate::error::CoreResult;
use crate::models::{BarSeries, MarketContext};

/// Labels market structure from the last two swing highs and lows.
///
/// Swing comparison only: break-of-structure is not considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextClassifier {
    detector: SwingDetector,
}

impl ContextClassifier {
    pub fn with_radius(radius: usize) -> Self {
        Self {
            detector: SwingDetector::with_radius(radius),
        }
    }

    pub fn radius(&self) -> usize {
        self.detector.radius
    }

    pub fn classify(&self, bars: &BarSeries) -> CoreResult<MarketContext> {
        let (highs, lows) = self.detector.detect(bars)?;
        Ok(classify_swings(&highs, &lows))
    }
}

/// HH + HL is bullish, LH + LL is bearish, anything else is undetermined.
pub fn classify_swings(highs: &[SwingPoint], lows: &[SwingPoint]) -> MarketContext {
    let (Some((prev_high, last_high)), Some((prev_low, last_low))) =
        (last_two(highs), last_two(lows))
    else {
        return MarketContext::Undetermined;
    };

    if last_high > prev_high && last_low > prev_low {
        MarketContext::Bullish
    } else if last_high < prev_high && last_low < prev_low {
        MarketContext::Bearish
    } else {
        MarketContext::Undetermined
    }
}

fn last_two(points: &[SwingPoint]) -> Option<(f64, f64)> {
    match points {
        [.., prev, last] => Some((prev.price, last.price)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::test_helpers::{bearish_structure, bullish_structure, make_hl_bars, make_zigzag};

    #[test]
    fn higher_highs_and_lows_are_bullish() {
        let ctx = ContextClassifier::default().classify(&bullish_structure()).unwrap();
        assert_eq!(ctx, MarketContext::Bullish);
    }

    #[test]
    fn lower_highs_and_lows_are_bearish() {
        let ctx = ContextClassifier::default().classify(&bearish_structure()).unwrap();
        assert_eq!(ctx, MarketContext::Bearish);
    }

    #[test]
    fn short_series_with_radius_one() {
        // Radius 1 lets four pivots show up inside a short series.
        let up = make_hl_bars(&[
            (10.0, 8.0),
            (12.0, 9.0),
            (11.0, 6.0),
            (14.0, 10.0),
            (13.0, 7.0),
            (16.0, 12.0),
        ]);
        let cls = ContextClassifier::with_radius(1);
        assert_eq!(cls.classify(&up).unwrap(), MarketContext::Bullish);

        let down = make_hl_bars(&[
            (16.0, 12.0),
            (15.0, 13.0),
            (17.0, 10.0),
            (13.0, 11.0),
            (14.0, 8.0),
            (10.0, 9.0),
        ]);
        assert_eq!(cls.classify(&down).unwrap(), MarketContext::Bearish);
    }

    #[test]
    fn flat_market_is_undetermined() {
        let flat = make_hl_bars(&[(100.5, 99.5); 20]);
        let ctx = ContextClassifier::default().classify(&flat).unwrap();
        assert_eq!(ctx, MarketContext::Undetermined);
    }

    #[test]
    fn mixed_structure_is_undetermined() {
        // Higher high but lower low: an expanding range.
        let bars = make_zigzag(&[100.0, 120.0, 110.0, 130.0, 105.0, 125.0], 6);
        let ctx = ContextClassifier::default().classify(&bars).unwrap();
        assert_eq!(ctx, MarketContext::Undetermined);
    }

    #[test]
    fn single_swing_is_undetermined() {
        let bars = make_zigzag(&[100.0, 120.0, 100.0], 6);
        let ctx = ContextClassifier::default().classify(&bars).unwrap();
        assert_eq!(ctx, MarketContext::Undetermined);
    }

    #[test]
    fn short_history_surfaces_error() {
        let bars = make_hl_bars(&[(2.0, 1.0); 4]);
        assert!(matches!(
            ContextClassifier::default().classify(&bars),
            Err(CoreError::InsufficientData { .. })
        ));
    }
}
