//! Once-a-day entry decision.
//!
//! A single linear pass over the current H1 history:
//!
//! 1. `AwaitingWindow`: inside the entry session and not yet traded today
//! 2. `ContextEvaluated`: H1 structure is bullish or bearish
//! 3. `LevelsComputed`: a valid swing stop exists
//! 4. `Sized`: positive stop distance, size at or above the minimum lot
//! 5. `Decided`: take-profit attached (possibly none), order intent emitted
//!
//! Falling out at any stage is a normal "no trade" result, reported through
//! [`Decision::NoAction`]. Only malformed input produces an `Err`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::StrategyConfig;
use crate::core::context::ContextClassifier;
use crate::core::levels::LevelSelector;
use crate::core::risk::{RiskSizer, MIN_LOT};
use crate::core::sessions::EntryWindow;
use crate::error::CoreResult;
use crate::models::{BarSeries, Direction, MarketContext};
use crate::strategies::signals::{order_comment, OrderIntent};

/// Market inputs for one decision.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub h1: BarSeries,
    pub current_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    AwaitingWindow,
    ContextEvaluated,
    LevelsComputed,
    Sized,
    Decided,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::AwaitingWindow => write!(f, "awaiting_window"),
            PipelineStage::ContextEvaluated => write!(f, "context_evaluated"),
            PipelineStage::LevelsComputed => write!(f, "levels_computed"),
            PipelineStage::Sized => write!(f, "sized"),
            PipelineStage::Decided => write!(f, "decided"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoActionReason {
    OutsideEntryWindow,
    AlreadyTradedToday,
    UndeterminedContext,
    NoStopLoss { direction: Direction },
    NonPositiveStopDistance { stop_distance: f64 },
    PositionTooSmall { lots: f64 },
}

impl NoActionReason {
    /// The stage at which the pass terminated.
    pub fn stage(&self) -> PipelineStage {
        match self {
            NoActionReason::OutsideEntryWindow | NoActionReason::AlreadyTradedToday => {
                PipelineStage::AwaitingWindow
            }
            NoActionReason::UndeterminedContext => PipelineStage::ContextEvaluated,
            NoActionReason::NoStopLoss { .. } => PipelineStage::LevelsComputed,
            NoActionReason::NonPositiveStopDistance { .. }
            | NoActionReason::PositionTooSmall { .. } => PipelineStage::Sized,
        }
    }
}

impl fmt::Display for NoActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoActionReason::OutsideEntryWindow => write!(f, "outside entry window"),
            NoActionReason::AlreadyTradedToday => write!(f, "already traded today"),
            NoActionReason::UndeterminedContext => write!(f, "context undetermined"),
            NoActionReason::NoStopLoss { direction } => {
                write!(f, "no valid stop-loss for {}", direction)
            }
            NoActionReason::NonPositiveStopDistance { stop_distance } => {
                write!(f, "stop distance {:.5} is not positive", stop_distance)
            }
            NoActionReason::PositionTooSmall { lots } => {
                write!(f, "position too small ({:.2} lots)", lots)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Trade(OrderIntent),
    NoAction(NoActionReason),
}

impl Decision {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Decision::Trade(_) => PipelineStage::Decided,
            Decision::NoAction(reason) => reason.stage(),
        }
    }

    pub fn intent(&self) -> Option<&OrderIntent> {
        match self {
            Decision::Trade(intent) => Some(intent),
            Decision::NoAction(_) => None,
        }
    }
}

pub struct DecisionPipeline {
    window: EntryWindow,
    classifier: ContextClassifier,
    levels: LevelSelector,
    sizer: RiskSizer,
    fractal_radius: usize,
    sl_offset_points: f64,
    risk_percent: f64,
    point_value: f64,
    tp_fallback_rr: Option<f64>,
}

impl DecisionPipeline {
    pub fn new(cfg: &StrategyConfig) -> Self {
        Self {
            window: EntryWindow::new(cfg.entry_session),
            classifier: ContextClassifier::with_radius(cfg.swing_radius_h1),
            levels: LevelSelector::with_swing_radius(cfg.swing_radius_h1),
            sizer: RiskSizer::new(cfg.min_lot_policy),
            fractal_radius: cfg.fractal_radius,
            sl_offset_points: cfg.sl_offset_points,
            risk_percent: cfg.risk_percent,
            point_value: cfg.point_value,
            tp_fallback_rr: cfg.tp_fallback_rr,
        }
    }

    pub fn classifier(&self) -> &ContextClassifier {
        &self.classifier
    }

    pub fn decide(
        &self,
        market: &MarketSnapshot,
        now: DateTime<Utc>,
        account: &AccountState,
        already_traded_today: bool,
    ) -> CoreResult<Decision> {
        let context = self.classifier.classify(&market.h1);
        self.decide_with_context(market, context, now, account, already_traded_today)
    }

    /// Same pass as [`decide`](Self::decide), reusing an H1 classification
    /// the caller already holds for `market.h1`. A classification error is
    /// only raised once the window checks pass.
    pub fn decide_with_context(
        &self,
        market: &MarketSnapshot,
        context: CoreResult<MarketContext>,
        now: DateTime<Utc>,
        account: &AccountState,
        already_traded_today: bool,
    ) -> CoreResult<Decision> {
        // AwaitingWindow
        if already_traded_today {
            return Ok(no_action(NoActionReason::AlreadyTradedToday));
        }
        if !self.window.contains(now) {
            return Ok(no_action(NoActionReason::OutsideEntryWindow));
        }

        // ContextEvaluated
        let context = context?;
        let Some(direction) = context.to_direction() else {
            return Ok(no_action(NoActionReason::UndeterminedContext));
        };

        // LevelsComputed
        let entry = market.current_price;
        let Some(stop_loss) =
            self.levels
                .stop_loss(direction, &market.h1, entry, self.sl_offset_points)?
        else {
            return Ok(no_action(NoActionReason::NoStopLoss { direction }));
        };

        // Sized
        let distance = stop_distance(direction, entry, stop_loss);
        if distance <= 0.0 {
            return Ok(no_action(NoActionReason::NonPositiveStopDistance {
                stop_distance: distance,
            }));
        }
        let lots = self
            .sizer
            .size(account.balance, self.risk_percent, distance, self.point_value)?;
        if lots < MIN_LOT {
            return Ok(no_action(NoActionReason::PositionTooSmall { lots }));
        }
        let actual_risk =
            RiskSizer::effective_risk_percent(account.balance, lots, distance, self.point_value);
        if actual_risk > self.risk_percent + 1e-9 {
            warn!(
                "Minimum lot exceeds risk budget: {:.2}% actual vs {:.2}% configured",
                actual_risk, self.risk_percent
            );
        }

        // Decided
        let take_profit = self.take_profit(direction, entry, stop_loss, &market.h1)?;
        let mut intent = OrderIntent {
            direction,
            volume_lots: lots,
            stop_loss: Some(stop_loss),
            take_profit,
            comment: order_comment(direction, context, now),
        };
        // Stop side is settled by the distance check; only the TP can be off.
        if !intent.is_consistent_with(entry) {
            warn!(
                "Dropping take-profit {:?} not beyond entry {:.5}",
                intent.take_profit, entry
            );
            intent.take_profit = None;
        }

        info!(
            "Order intent: {} {:.2} lots @ {:.5} | SL {:.5} | TP {}",
            direction,
            lots,
            entry,
            stop_loss,
            intent
                .take_profit
                .map_or_else(|| "none".to_string(), |tp| format!("{:.5}", tp)),
        );

        Ok(Decision::Trade(intent))
    }

    fn take_profit(
        &self,
        direction: Direction,
        entry: f64,
        stop_loss: f64,
        h1: &BarSeries,
    ) -> CoreResult<Option<f64>> {
        let fractal_tp = self
            .levels
            .take_profit(direction, entry, h1, self.fractal_radius)?;
        if fractal_tp.is_some() {
            return Ok(fractal_tp);
        }
        let fallback = self
            .tp_fallback_rr
            .and_then(|rr| LevelSelector::fallback_take_profit(direction, entry, stop_loss, rr));
        match fallback {
            Some(tp) => debug!("No fractal target; using R:R fallback TP {:.5}", tp),
            None => debug!("No fractal target; trading with stop-loss only"),
        }
        Ok(fallback)
    }
}

/// Signed distance from entry to stop; positive when the stop is on the
/// losing side.
pub fn stop_distance(direction: Direction, entry: f64, stop_loss: f64) -> f64 {
    match direction {
        Direction::Buy => entry - stop_loss,
        Direction::Sell => stop_loss - entry,
    }
}

fn no_action(reason: NoActionReason) -> Decision {
    debug!("No action at {}: {}", reason.stage(), reason);
    Decision::NoAction(reason)
}
