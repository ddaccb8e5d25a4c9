//! Order book module
//!
//! Maintains the sorted bid/ask price-level ladders for a single instrument
//! and executes market-order sweeps against them.

mod book;

pub use book::OrderBook;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// A single level in the order book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub volume: i64,
}

/// A priced execution: what actually traded, at what price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub price: Decimal,
    pub volume: i64,
}

/// Outcome of a market-order sweep
///
/// `executed` may be less than the requested volume when the swept side ran
/// out of liquidity; that is a normal partial fill, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    /// Volume-weighted average execution price, zero if nothing executed
    pub avg_price: Decimal,
    pub executed: i64,
}

/// How per-level volumes are drawn when seeding synthetic depth
#[derive(Debug, Clone)]
pub enum VolumeModel {
    /// Every level carries the same volume
    Fixed(i64),
    /// `base + increment * level_index`, deeper levels carry more
    Ramp { base: i64, increment: i64 },
    /// Uniform draw from `[min, max]` per level
    Random { min: i64, max: i64 },
}
