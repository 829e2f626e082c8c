use anyhow::{Context, Result};
use chrono::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use daily_swing_bot::bot::{CycleOutcome, DailyBot};
use daily_swing_bot::config::Config;
use daily_swing_bot::exchange::HistoricalExchange;
use daily_swing_bot::models::{BarSeries, Timeframe};

/// Replays an H1 bar file through the daily bot.
///
/// Usage: `daily-swing-bot [h1.json] [m1.json]`. Falls back to `BARS_FILE`,
/// then `data/h1.json`.
#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    cfg.validate().context("invalid configuration")?;

    let args: Vec<String> = std::env::args().collect();
    let h1_path = args
        .get(1)
        .cloned()
        .or_else(|| std::env::var("BARS_FILE").ok())
        .unwrap_or_else(|| "data/h1.json".to_string());

    let mut exchange = HistoricalExchange::new(cfg.initial_balance);
    let h1 = load_bars(&h1_path)?;
    info!("Loaded {} H1 bars from {}", h1.len(), h1_path);
    exchange.load(Timeframe::H1, h1);

    if let Some(m1_path) = args.get(2) {
        let m1 = load_bars(m1_path)?;
        info!("Loaded {} M1 bars from {}", m1.len(), m1_path);
        exchange.load(Timeframe::M1, m1);
    }

    let (Some(start), Some(end)) = (exchange.earliest_time(), exchange.latest_time()) else {
        anyhow::bail!("no bars in {}", h1_path);
    };
    let step = Duration::seconds(cfg.check_interval_secs as i64);

    let mut bot = DailyBot::new(cfg, exchange);
    let mut cycles = 0u64;
    let mut failures = 0u64;
    let mut now = start;
    while now <= end {
        bot.broker_mut().set_time(now);
        match bot.run_cycle(now).await {
            CycleOutcome::DataUnavailable
            | CycleOutcome::AnalysisFailed(_)
            | CycleOutcome::OrderFailed => failures += 1,
            CycleOutcome::NoAction(_) | CycleOutcome::OrderPlaced(_) => {}
        }
        cycles += 1;
        now += step;
    }

    let orders = bot.broker().orders();
    info!(
        "Replay finished: {} cycles, {} orders, {} failed cycles",
        cycles,
        orders.len(),
        failures
    );
    for order in orders {
        println!("{}", serde_json::to_string(order)?);
    }

    Ok(())
}

fn load_bars(path: &str) -> Result<BarSeries> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing bars from {}", path))
}
