pub mod historical;

pub use historical::HistoricalExchange;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BarSeries, Timeframe};
use crate::strategies::signals::OrderIntent;

/// Read side of the broker: bar history, last price, account balance.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    async fn fetch_bars(&mut self, tf: Timeframe, count: usize) -> Result<BarSeries>;
    async fn get_current_price(&mut self) -> Result<f64>;
    async fn get_account_balance(&mut self) -> Result<f64>;
}

/// Write side of the broker. Implementations own symbol lookup, volume
/// units and framing.
#[async_trait]
pub trait OrderExecutionPort: Send + Sync {
    async fn place_market_order(&mut self, symbol: &str, intent: &OrderIntent)
        -> Result<PlacedOrder>;
}

pub trait Broker: MarketDataPort + OrderExecutionPort {}

impl<T: MarketDataPort + OrderExecutionPort> Broker for T {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub id: u64,
    pub symbol: String,
    pub placed_at: DateTime<Utc>,
    pub entry_price: f64,
    pub intent: OrderIntent,
}
