//! Position sizing from a fixed-percent risk budget.
//!
//! ```text
//! lots = floor_0.01( balance * risk% / (stop_distance * point_value) )
//! ```
//!
//! Sizes are truncated, never rounded up. Below the minimum lot, the
//! configured [`MinLotPolicy`] decides between trading the minimum and
//! skipping the trade.

use crate::config::MinLotPolicy;
use crate::error::{CoreError, CoreResult};

pub const MIN_LOT: f64 = 0.01;
const LOTS_PER_UNIT: f64 = 100.0;
// Absorbs representation error so an exact 20.00 is not truncated to 19.99.
const LOT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct RiskSizer {
    pub min_lot_policy: MinLotPolicy,
}

impl Default for RiskSizer {
    fn default() -> Self {
        Self::new(MinLotPolicy::Floor)
    }
}

impl RiskSizer {
    pub fn new(min_lot_policy: MinLotPolicy) -> Self {
        Self { min_lot_policy }
    }

    pub fn size(
        &self,
        balance: f64,
        risk_percent: f64,
        stop_distance: f64,
        point_value: f64,
    ) -> CoreResult<f64> {
        require_positive("balance", balance)?;
        require_positive("risk_percent", risk_percent)?;
        require_positive("stop_distance", stop_distance)?;
        require_positive("point_value", point_value)?;

        let risk_amount = balance * risk_percent / 100.0;
        let cost_per_lot = stop_distance * point_value;
        let raw_lots = risk_amount / cost_per_lot;
        let lots = floor_to_step(raw_lots);

        if lots >= MIN_LOT {
            return Ok(lots);
        }
        Ok(match self.min_lot_policy {
            MinLotPolicy::Floor => MIN_LOT,
            MinLotPolicy::Reject => 0.0,
        })
    }

    /// Fraction of `balance` actually lost if the stop is hit at `lots`.
    pub fn effective_risk_percent(
        balance: f64,
        lots: f64,
        stop_distance: f64,
        point_value: f64,
    ) -> f64 {
        if balance <= 0.0 {
            return 0.0;
        }
        lots * stop_distance * point_value / balance * 100.0
    }
}

fn require_positive(field: &'static str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidRiskInput { field, value })
    }
}

fn floor_to_step(lots: f64) -> f64 {
    (lots * LOTS_PER_UNIT + LOT_EPSILON).floor() / LOTS_PER_UNIT
}
