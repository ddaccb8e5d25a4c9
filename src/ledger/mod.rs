//! Position ledger module
//!
//! Tracks cumulative traded volumes and amounts for the campaign, derives
//! VWAP and realized/unrealized PnL, and keeps the per-fill time-series
//! trace consumed by the report writer.

mod position;
mod summary;

pub use position::PositionLedger;
pub use summary::{PositionStatus, ReportSummary};

use rust_decimal::Decimal;
use serde::Serialize;

/// Caller-supplied phase/action tag attached to each recorded fill
#[derive(Debug, Clone, Copy)]
pub struct TraceLabel<'a> {
    pub phase: &'a str,
    pub action: &'a str,
}

impl<'a> TraceLabel<'a> {
    pub const fn new(phase: &'a str, action: &'a str) -> Self {
        Self { phase, action }
    }
}

/// One row of the campaign's time-series trace
///
/// Regular sells carry negative volume; buys, trap steps and stop-order
/// sales carry positive volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub time_step: u32,
    pub price: Decimal,
    pub volume: i64,
    pub phase: String,
    pub action: String,
}

/// Direction of a multi-step trap fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiStepKind {
    /// Sell walking the price down from start toward end
    TrapSell,
    /// Buy walking the price back up from start toward end
    TrapBuyback,
}
