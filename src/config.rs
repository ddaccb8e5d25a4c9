//! Configuration module for the campaign simulator

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

/// Campaign configuration
///
/// All numeric parameters are opaque to the core: the order book and ledger
/// take them as plain values, and range validation is the caller's concern.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Instrument identifier (e.g. "PUM.DE")
    pub instrument: String,

    /// Reference price the campaign starts from
    pub initial_price: Decimal,

    /// Total share volume the campaign aims to move
    pub target_volume: i64,

    /// Capital ceiling for the campaign
    pub capital_limit: Decimal,

    /// Whether the trap flush phase runs between accumulation and impulse
    pub enable_trap_phase: bool,

    /// Trap sell-off depth as a percent of the base price
    pub trap_drop_percent: Decimal,

    /// Stop-loss trigger as a percent below the initial price
    pub stop_loss_percent: Decimal,

    /// Linear price impact per traded share
    pub price_impact_per_share: Decimal,

    /// Synthetic depth levels per side when seeding the book
    pub book_levels: usize,

    /// Price increment between seeded levels
    pub book_price_step: Decimal,

    /// Number of passive-buy lots in the accumulation phase
    pub accumulation_lots: u32,

    /// Shares per accumulation lot
    pub accumulation_lot_size: i64,

    /// Accumulation price band (uniform draws within it)
    pub accumulation_price_min: Decimal,
    pub accumulation_price_max: Decimal,
}

impl StrategyConfig {
    /// Load configuration from an optional JSON file plus `TRADER_`-prefixed
    /// environment variables; unset values fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("TRADER"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            instrument: "PUM.DE".to_string(),
            initial_price: Decimal::new(2275, 2),
            target_volume: 170_000,
            capital_limit: Decimal::from(30_000_000),
            enable_trap_phase: true,
            trap_drop_percent: Decimal::new(5, 1),
            stop_loss_percent: Decimal::new(30, 1),
            price_impact_per_share: Decimal::new(11, 6),
            book_levels: 5,
            book_price_step: Decimal::new(1, 2),
            accumulation_lots: 50,
            accumulation_lot_size: 1000,
            accumulation_price_min: Decimal::new(2321, 2),
            accumulation_price_max: Decimal::new(2350, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StrategyConfig::default();
        assert_eq!(config.instrument, "PUM.DE");
        assert_eq!(config.initial_price, dec!(22.75));
        assert_eq!(config.stop_loss_percent, dec!(3.0));
        assert_eq!(config.price_impact_per_share, dec!(0.000011));
        assert!(config.enable_trap_phase);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"{{"instrument": "ADS.DE", "initial_price": "180.50", "enable_trap_phase": false}}"#
        )
        .unwrap();

        let config = StrategyConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.instrument, "ADS.DE");
        assert_eq!(config.initial_price, dec!(180.50));
        assert!(!config.enable_trap_phase);
        // Unset fields keep defaults
        assert_eq!(config.target_volume, 170_000);
    }
}
