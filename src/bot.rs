use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::core::context::ContextClassifier;
use crate::error::{CoreError, CoreResult};
use crate::exchange::{Broker, PlacedOrder};
use crate::models::{MarketContext, Timeframe};
use crate::strategies::daily_entry::{
    AccountState, Decision, DecisionPipeline, MarketSnapshot, NoActionReason, PipelineStage,
};

/// What one trading cycle ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    DataUnavailable,
    AnalysisFailed(CoreError),
    NoAction(NoActionReason),
    OrderPlaced(PlacedOrder),
    OrderFailed,
}

/// Drives the daily entry pipeline against a broker.
///
/// Owns the only mutable state in the system: the current context (for
/// change logging) and the once-per-UTC-day trade flag.
pub struct DailyBot<B: Broker> {
    config: Config,
    broker: B,
    pipeline: DecisionPipeline,
    h4_classifier: ContextClassifier,

    current_context: Option<MarketContext>,
    trade_taken_today: bool,
    last_check_day: Option<NaiveDate>,
}

impl<B: Broker> DailyBot<B> {
    pub fn new(config: Config, broker: B) -> Self {
        info!("{}", "=".repeat(60));
        info!("Daily swing bot starting up");
        info!("Symbol: {}", config.symbol);
        info!(
            "Swing radius H1/H4: {}/{} | Fractal radius: {}",
            config.swing_radius_h1, config.swing_radius_h4, config.fractal_radius
        );
        info!(
            "Risk: {}% | Point value: {} | SL offset: {} | Min lot: {:?}",
            config.risk_percent, config.point_value, config.sl_offset_points, config.min_lot_policy
        );
        info!(
            "Entry window (UTC): {:02}:{:02}-{:02}:{:02}",
            config.entry_session.start.0,
            config.entry_session.start.1,
            config.entry_session.end.0,
            config.entry_session.end.1
        );
        info!("{}", "=".repeat(60));

        let pipeline = DecisionPipeline::new(&config.strategy());
        let h4_classifier = ContextClassifier::with_radius(config.swing_radius_h4);

        Self {
            config,
            broker,
            pipeline,
            h4_classifier,
            current_context: None,
            trade_taken_today: false,
            last_check_day: None,
        }
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }

    pub fn current_context(&self) -> Option<MarketContext> {
        self.current_context
    }

    pub fn trade_taken_today(&self) -> bool {
        self.trade_taken_today
    }

    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        self.roll_day(now);

        let (snapshot, account) = match self.fetch_snapshot().await {
            Ok(fetched) => fetched,
            Err(e) => {
                error!("Data fetch failed, skipping cycle: {:#}", e);
                return CycleOutcome::DataUnavailable;
            }
        };

        let context = self.pipeline.classifier().classify(&snapshot.h1);
        self.track_context(&context);

        let decision = match self.pipeline.decide_with_context(
            &snapshot,
            context,
            now,
            &account,
            self.trade_taken_today,
        ) {
            Ok(d) => d,
            Err(e) => {
                warn!("Analysis failed: {}", e);
                return CycleOutcome::AnalysisFailed(e);
            }
        };

        let intent = match decision {
            Decision::Trade(intent) => intent,
            Decision::NoAction(reason) => {
                if reason == NoActionReason::AlreadyTradedToday {
                    debug!("Trade for {} already taken, waiting for next day", now.date_naive());
                } else if reason.stage() != PipelineStage::AwaitingWindow {
                    info!("Setup rejected at {}: {}", reason.stage(), reason);
                }
                return CycleOutcome::NoAction(reason);
            }
        };

        match self
            .broker
            .place_market_order(&self.config.symbol, &intent)
            .await
        {
            Ok(order) => {
                info!(
                    "Order #{} placed: {} {:.2} lots {} @ {:.5} ({})",
                    order.id,
                    intent.direction,
                    intent.volume_lots,
                    order.symbol,
                    order.entry_price,
                    intent.comment
                );
                self.trade_taken_today = true;
                CycleOutcome::OrderPlaced(order)
            }
            Err(e) => {
                error!("Order placement failed: {:#}", e);
                CycleOutcome::OrderFailed
            }
        }
    }

    fn roll_day(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if self.last_check_day != Some(today) {
            info!("--- New trading day: {} ---", today);
            self.trade_taken_today = false;
            self.last_check_day = Some(today);
        }
    }

    async fn fetch_snapshot(&mut self) -> Result<(MarketSnapshot, AccountState)> {
        let h4 = self
            .broker
            .fetch_bars(Timeframe::H4, self.config.history_h4)
            .await
            .context("H4 bars")?;
        let h1 = self
            .broker
            .fetch_bars(Timeframe::H1, self.config.history_h1)
            .await
            .context("H1 bars")?;
        let current_price = self
            .broker
            .get_current_price()
            .await
            .context("current price")?;
        let balance = self
            .broker
            .get_account_balance()
            .await
            .context("account balance")?;

        if h4.is_empty() || h1.is_empty() {
            bail!("empty history (H4: {} bars, H1: {} bars)", h4.len(), h1.len());
        }

        match self.h4_classifier.classify(&h4) {
            Ok(ctx) => debug!("H4 context: {}", ctx),
            Err(e) => debug!("H4 context unavailable: {}", e),
        }

        Ok((MarketSnapshot { h1, current_price }, AccountState { balance }))
    }

    fn track_context(&mut self, context: &CoreResult<MarketContext>) {
        let context = match context {
            Ok(ctx) => *ctx,
            Err(e) => {
                debug!("H1 context unavailable: {}", e);
                return;
            }
        };
        if self.current_context != Some(context) {
            info!(
                "Context change: {} -> {}",
                self.current_context
                    .map_or_else(|| "none".to_string(), |c| c.to_string()),
                context
            );
            self.current_context = Some(context);
        }
    }
}
