use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// UTC wall-clock window, `(hour, minute)` pairs; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTime {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

/// What the sizer does when the risk budget buys less than the minimum lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinLotPolicy {
    /// Trade the minimum lot anyway (may exceed the configured risk).
    Floor,
    /// Return zero so the trade is skipped.
    Reject,
}

impl MinLotPolicy {
    fn parse(s: &str) -> MinLotPolicy {
        match s.trim().to_lowercase().as_str() {
            "reject" => MinLotPolicy::Reject,
            _ => MinLotPolicy::Floor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub symbol: String,

    // Analysis
    pub swing_radius_h1: usize,
    pub swing_radius_h4: usize,
    pub fractal_radius: usize,
    pub sl_offset_points: f64,

    // Risk
    pub risk_percent: f64,
    pub point_value: f64,
    pub min_lot_policy: MinLotPolicy,
    pub tp_fallback_rr: Option<f64>,

    // Timing
    pub entry_session: SessionTime,
    pub check_interval_secs: u64,

    // Data
    pub history_h1: usize,
    pub history_h4: usize,

    // Replay only
    pub initial_balance: f64,

    // Logging
    pub log_level: String,
}

/// The subset of [`Config`] the decision pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub swing_radius_h1: usize,
    pub fractal_radius: usize,
    pub sl_offset_points: f64,
    pub risk_percent: f64,
    pub point_value: f64,
    pub min_lot_policy: MinLotPolicy,
    pub tp_fallback_rr: Option<f64>,
    pub entry_session: SessionTime,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            symbol: env("SYMBOL", "GER40"),
            swing_radius_h1: env("SWING_LOOKBACK_H1", "5").parse().unwrap_or(5),
            swing_radius_h4: env("SWING_LOOKBACK_H4", "3").parse().unwrap_or(3),
            fractal_radius: env("FRACTAL_LOOKBACK_H1", "2").parse().unwrap_or(2),
            sl_offset_points: env("SL_OFFSET_POINTS", "2.0").parse().unwrap_or(2.0),
            risk_percent: env("RISK_PER_TRADE_PERCENT", "1.0").parse().unwrap_or(1.0),
            point_value: env("POINT_VALUE", "1.0").parse().unwrap_or(1.0),
            min_lot_policy: MinLotPolicy::parse(&env("MIN_LOT_POLICY", "floor")),
            tp_fallback_rr: std::env::var("TP_FALLBACK_RR")
                .ok()
                .and_then(|s| s.parse().ok()),
            entry_session: SessionTime {
                start: parse_hhmm(&env("ENTRY_START_UTC", "00:00")).unwrap_or((0, 0)),
                end: parse_hhmm(&env("ENTRY_END_UTC", "01:00")).unwrap_or((1, 0)),
            },
            check_interval_secs: env("CHECK_INTERVAL_SECONDS", "300")
                .parse()
                .unwrap_or(300),
            history_h1: env("HISTORY_H1", "150").parse().unwrap_or(150),
            history_h4: env("HISTORY_H4", "100").parse().unwrap_or(100),
            initial_balance: env("INITIAL_BALANCE", "10000")
                .parse()
                .unwrap_or(10_000.0),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.symbol.is_empty(), "SYMBOL must not be empty");
        ensure!(
            self.swing_radius_h1 > 0 && self.swing_radius_h4 > 0 && self.fractal_radius > 0,
            "lookback radii must be at least 1"
        );
        ensure!(
            self.sl_offset_points >= 0.0,
            "SL_OFFSET_POINTS must not be negative, got {}",
            self.sl_offset_points
        );
        ensure!(
            self.risk_percent > 0.0,
            "RISK_PER_TRADE_PERCENT must be positive, got {}",
            self.risk_percent
        );
        ensure!(
            self.point_value > 0.0,
            "POINT_VALUE must be positive, got {}",
            self.point_value
        );
        ensure!(
            self.check_interval_secs > 0,
            "CHECK_INTERVAL_SECONDS must be positive"
        );
        if let Some(rr) = self.tp_fallback_rr {
            ensure!(rr > 0.0, "TP_FALLBACK_RR must be positive, got {}", rr);
        }
        let (sh, sm) = self.entry_session.start;
        let (eh, em) = self.entry_session.end;
        ensure!(
            sh < 24 && sm < 60 && eh < 24 && em < 60,
            "entry session times must be valid HH:MM"
        );
        Ok(())
    }

    pub fn strategy(&self) -> StrategyConfig {
        StrategyConfig {
            swing_radius_h1: self.swing_radius_h1,
            fractal_radius: self.fractal_radius,
            sl_offset_points: self.sl_offset_points,
            risk_percent: self.risk_percent,
            point_value: self.point_value,
            min_lot_policy: self.min_lot_policy,
            tp_fallback_rr: self.tp_fallback_rr,
            entry_session: self.entry_session,
        }
    }
}

fn parse_hhmm(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some((h, m))
}
