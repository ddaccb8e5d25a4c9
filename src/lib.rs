//! Price-Impact Trader - Campaign Simulator Library
//!
//! This crate models a single-instrument trading campaign: a limit order
//! book that executes market orders against resting liquidity, and a
//! position ledger that applies linear price impact and tracks realized and
//! unrealized PnL across a scripted multi-phase strategy.

pub mod config;
pub mod error;
pub mod ledger;
pub mod orderbook;
pub mod pricer;
pub mod report;
pub mod strategy;

pub use config::StrategyConfig;
pub use error::{Result, TraderError};
pub use ledger::{
    MultiStepKind, PositionLedger, PositionStatus, ReportSummary, TraceLabel, TraceRecord,
};
pub use orderbook::{Fill, OrderBook, PriceLevel, Side, SweepResult, VolumeModel};
pub use pricer::{BookSweepPricer, Direction, ImpactFormulaPricer, Pricer};
pub use strategy::TradingStrategy;
