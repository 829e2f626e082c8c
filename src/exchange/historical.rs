use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::exchange::{MarketDataPort, OrderExecutionPort, PlacedOrder};
use crate::models::{BarSeries, Timeframe};
use crate::strategies::signals::OrderIntent;

/// Replays pre-loaded history behind a movable clock.
///
/// Only bars with `timestamp <= now` are visible. Orders are filled at the
/// current price and kept in memory.
pub struct HistoricalExchange {
    data: HashMap<Timeframe, BarSeries>,
    now: DateTime<Utc>,
    balance: f64,
    orders: Vec<PlacedOrder>,
}

impl HistoricalExchange {
    pub fn new(balance: f64) -> Self {
        Self {
            data: HashMap::new(),
            now: DateTime::<Utc>::MIN_UTC,
            balance,
            orders: Vec::new(),
        }
    }

    pub fn load(&mut self, tf: Timeframe, bars: BarSeries) {
        self.data.insert(tf, bars);
    }

    pub fn set_time(&mut self, t: DateTime<Utc>) {
        self.now = t;
    }

    pub fn earliest_time(&self) -> Option<DateTime<Utc>> {
        self.data
            .values()
            .filter_map(|s| s.first().map(|b| b.timestamp))
            .min()
    }

    pub fn latest_time(&self) -> Option<DateTime<Utc>> {
        self.data
            .values()
            .filter_map(|s| s.last().map(|b| b.timestamp))
            .max()
    }

    pub fn orders(&self) -> &[PlacedOrder] {
        &self.orders
    }

    fn visible(&self, tf: Timeframe, limit: usize) -> BarSeries {
        self.data
            .get(&tf)
            .map(|s| s.up_to(self.now, limit))
            .unwrap_or_default()
    }
}

#[async_trait]
impl MarketDataPort for HistoricalExchange {
    async fn fetch_bars(&mut self, tf: Timeframe, count: usize) -> Result<BarSeries> {
        if tf == Timeframe::H4 && !self.data.contains_key(&Timeframe::H4) {
            // Four H1 bars per H4 bar, plus one partial bucket at the front.
            let h1 = self.visible(Timeframe::H1, count * 4 + 4);
            return Ok(h1.resample(Timeframe::H4.as_duration()).tail(count));
        }
        Ok(self.visible(tf, count))
    }

    async fn get_current_price(&mut self) -> Result<f64> {
        let tf = if self.data.contains_key(&Timeframe::M1) {
            Timeframe::M1
        } else {
            Timeframe::H1
        };
        self.visible(tf, 1)
            .last()
            .map(|b| b.close)
            .context("No price data at current time")
    }

    async fn get_account_balance(&mut self) -> Result<f64> {
        Ok(self.balance)
    }
}

#[async_trait]
impl OrderExecutionPort for HistoricalExchange {
    async fn place_market_order(
        &mut self,
        symbol: &str,
        intent: &OrderIntent,
    ) -> Result<PlacedOrder> {
        if intent.volume_lots <= 0.0 {
            bail!("Refusing order with volume {:.2} lots", intent.volume_lots);
        }
        let entry_price = self.get_current_price().await?;
        let order = PlacedOrder {
            id: self.orders.len() as u64 + 1,
            symbol: symbol.to_string(),
            placed_at: self.now,
            entry_price,
            intent: intent.clone(),
        };
        self.orders.push(order.clone());
        Ok(order)
    }
}
