use crate::core::extrema::{FractalDetector, SwingDetector};
use crate::error::CoreResult;
use crate::models::{BarSeries, Direction};

/// Instrument price precision.
const PRICE_DECIMALS: i32 = 5;

/// Picks stop-loss and take-profit prices from swing and fractal structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelSelector {
    swings: SwingDetector,
}

impl LevelSelector {
    pub fn with_swing_radius(radius: usize) -> Self {
        Self {
            swings: SwingDetector::with_radius(radius),
        }
    }

    /// Stop beyond the most recent swing against the trade.
    ///
    /// `None` when there is no swing, or the swing is not strictly on the
    /// losing side of `current_price`.
    pub fn stop_loss(
        &self,
        direction: Direction,
        bars: &BarSeries,
        current_price: f64,
        offset_points: f64,
    ) -> CoreResult<Option<f64>> {
        let (highs, lows) = self.swings.detect(bars)?;

        let stop = match direction {
            Direction::Buy => lows
                .last()
                .filter(|low| low.price < current_price)
                .map(|low| low.price - offset_points),
            Direction::Sell => highs
                .last()
                .filter(|high| high.price > current_price)
                .map(|high| high.price + offset_points),
        };

        Ok(stop.map(round_price))
    }

    /// Nearest fractal in the direction of the trade.
    ///
    /// BUY takes the earliest fractal high above entry, SELL the latest
    /// fractal low below it. The side check runs on the rounded price, so a
    /// candidate that rounds onto or through entry is dropped.
    pub fn take_profit(
        &self,
        direction: Direction,
        entry_price: f64,
        bars: &BarSeries,
        fractal_radius: usize,
    ) -> CoreResult<Option<f64>> {
        let (up, down) = FractalDetector::with_radius(fractal_radius).detect(bars)?;

        let candidate = match direction {
            Direction::Buy => up.iter().find(|f| f.price > entry_price).map(|f| f.price),
            Direction::Sell => down.iter().rev().find(|f| f.price < entry_price).map(|f| f.price),
        };

        Ok(candidate
            .map(round_price)
            .filter(|&tp| beyond_entry(direction, entry_price, tp)))
    }

    /// Fixed reward:risk target, `entry +/- rr * |entry - stop|`.
    pub fn fallback_take_profit(
        direction: Direction,
        entry_price: f64,
        stop_loss: f64,
        reward_risk: f64,
    ) -> Option<f64> {
        let distance = (entry_price - stop_loss).abs() * reward_risk;
        let tp = match direction {
            Direction::Buy => entry_price + distance,
            Direction::Sell => entry_price - distance,
        };
        Some(round_price(tp)).filter(|&tp| beyond_entry(direction, entry_price, tp))
    }
}

/// True when `price` is strictly on the profitable side of `entry`.
pub fn beyond_entry(direction: Direction, entry: f64, price: f64) -> bool {
    match direction {
        Direction::Buy => price > entry,
        Direction::Sell => price < entry,
    }
}

pub fn round_price(price: f64) -> f64 {
    let factor = 10f64.powi(PRICE_DECIMALS);
    (price * factor).round() / factor
}
