//! Price-Impact Trader - Campaign Simulator
//!
//! Runs the scripted multi-phase campaign against the position ledger and
//! writes the trading summary and price-history trace to disk.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use price_impact_trader::{report, PositionLedger, StrategyConfig, TradingStrategy};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Price-Impact Trading Campaign Simulator");

    // Load configuration
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match config_path {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "loading configuration");
            StrategyConfig::load(Some(path.as_path()))?
        }
        _ => {
            info!("using default configuration");
            StrategyConfig::default()
        }
    };

    // Run the campaign
    let mut ledger = PositionLedger::new(config.initial_price);
    let mut strategy = TradingStrategy::new(config, StdRng::from_entropy());
    strategy.run(&mut ledger);

    // Generate the report
    let summary = ledger.report(ledger.current_price());
    for line in report::render_summary(&summary) {
        info!("{line}");
    }
    report::write_report(Path::new("."), &summary, ledger.trace())?;

    info!("campaign completed");
    Ok(())
}
