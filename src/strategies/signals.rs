use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::levels::beyond_entry;
use crate::models::{Direction, MarketContext};

/// A market order the pipeline wants placed; the execution port owns the
/// wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub direction: Direction,
    pub volume_lots: f64,
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    pub comment: String,
}

impl OrderIntent {
    /// Stop present and on the losing side of `entry`; TP, if any, on the
    /// winning side.
    pub fn is_consistent_with(&self, entry: f64) -> bool {
        let stop_ok = self
            .stop_loss
            .is_some_and(|sl| beyond_entry(opposite(self.direction), entry, sl));
        let tp_ok = self
            .take_profit
            .map_or(true, |tp| beyond_entry(self.direction, entry, tp));
        stop_ok && tp_ok
    }
}

pub fn order_comment(direction: Direction, context: MarketContext, now: DateTime<Utc>) -> String {
    format!("Daily {} {} {}", direction, context, now.format("%Y%m%d"))
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Buy => Direction::Sell,
        Direction::Sell => Direction::Buy,
    }
}
