//! Core order book implementation
//!
//! Uses BTreeMap for efficient sorted price level management.

use rand::Rng;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::{PriceLevel, Side, SweepResult, VolumeModel};
use crate::error::{Result, TraderError};

/// Order book for a single instrument
#[derive(Debug)]
pub struct OrderBook {
    symbol: String,
    /// Bids sorted by price descending (highest first)
    bids: BTreeMap<Reverse<Decimal>, i64>,
    /// Asks sorted by price ascending (lowest first)
    asks: BTreeMap<Decimal, i64>,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    /// Seed synthetic depth around a mid price
    ///
    /// Builds `levels` price steps below and above `mid_price`, drawing each
    /// level's volume from the model. Replaces any existing depth.
    pub fn seed<R: Rng>(
        &mut self,
        mid_price: Decimal,
        levels: usize,
        step: Decimal,
        model: &VolumeModel,
        rng: &mut R,
    ) {
        self.bids.clear();
        self.asks.clear();

        for i in 0..levels {
            let offset = step * Decimal::from(i as u64 + 1);
            let bid_volume = model.sample(i, rng);
            if bid_volume > 0 {
                self.bids.insert(Reverse(mid_price - offset), bid_volume);
            }
            let ask_volume = model.sample(i, rng);
            if ask_volume > 0 {
                self.asks.insert(mid_price + offset, ask_volume);
            }
        }
    }

    /// Seed with an explicit per-depth volume sequence, for reproducible
    /// setups; both sides get the same volumes.
    pub fn seed_with_volumes(&mut self, mid_price: Decimal, step: Decimal, volumes: &[i64]) {
        self.bids.clear();
        self.asks.clear();

        for (i, &volume) in volumes.iter().enumerate() {
            if volume <= 0 {
                continue;
            }
            let offset = step * Decimal::from(i as u64 + 1);
            self.bids.insert(Reverse(mid_price - offset), volume);
            self.asks.insert(mid_price + offset, volume);
        }
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Result<Decimal> {
        self.bids
            .first_key_value()
            .map(|(Reverse(p), _)| *p)
            .ok_or(TraderError::EmptyBook { side: Side::Bid })
    }

    /// Get best ask price
    pub fn best_ask(&self) -> Result<Decimal> {
        self.asks
            .first_key_value()
            .map(|(p, _)| *p)
            .ok_or(TraderError::EmptyBook { side: Side::Ask })
    }

    /// Get bid-ask spread
    ///
    /// May be zero or negative after a price shift left the book crossed;
    /// callers must tolerate a non-positive spread.
    pub fn spread(&self) -> Result<Decimal> {
        Ok(self.best_ask()? - self.best_bid()?)
    }

    /// Get mid price
    pub fn mid_price(&self) -> Result<Decimal> {
        Ok((self.best_bid()? + self.best_ask()?) / Decimal::from(2))
    }

    /// Execute a market buy against the ask ladder
    ///
    /// Consumes levels from the best ask upward until `target_volume` is
    /// filled or the side is exhausted. A partial fill is a normal outcome.
    pub fn sweep_market_buy(&mut self, target_volume: i64) -> SweepResult {
        if target_volume <= 0 {
            return SweepResult {
                avg_price: Decimal::ZERO,
                executed: 0,
            };
        }

        let mut remaining = target_volume;
        let mut cost = Decimal::ZERO;
        let mut executed = 0i64;

        while remaining > 0 {
            let Some((&price, &level_volume)) = self.asks.iter().next() else {
                break;
            };
            let take = remaining.min(level_volume);
            cost += price * Decimal::from(take);
            executed += take;
            remaining -= take;

            if take == level_volume {
                self.asks.remove(&price);
            } else if let Some(v) = self.asks.get_mut(&price) {
                *v -= take;
            }
        }

        SweepResult {
            avg_price: average(cost, executed),
            executed,
        }
    }

    /// Execute a market sell against the bid ladder
    pub fn sweep_market_sell(&mut self, target_volume: i64) -> SweepResult {
        if target_volume <= 0 {
            return SweepResult {
                avg_price: Decimal::ZERO,
                executed: 0,
            };
        }

        let mut remaining = target_volume;
        let mut proceeds = Decimal::ZERO;
        let mut executed = 0i64;

        while remaining > 0 {
            let Some((&Reverse(price), &level_volume)) = self.bids.iter().next() else {
                break;
            };
            let take = remaining.min(level_volume);
            proceeds += price * Decimal::from(take);
            executed += take;
            remaining -= take;

            if take == level_volume {
                self.bids.remove(&Reverse(price));
            } else if let Some(v) = self.bids.get_mut(&Reverse(price)) {
                *v -= take;
            }
        }

        SweepResult {
            avg_price: average(proceeds, executed),
            executed,
        }
    }

    /// Add resting volume at a price, merging into an existing level
    pub fn insert_limit_order(&mut self, price: Decimal, volume: i64, side: Side) {
        if volume <= 0 {
            return;
        }
        match side {
            Side::Bid => {
                *self.bids.entry(Reverse(price)).or_insert(0) += volume;
            }
            Side::Ask => {
                *self.asks.entry(price).or_insert(0) += volume;
            }
        }
    }

    /// Shift every level's price on both sides by `shift`
    ///
    /// Models market-wide drift independent of a specific sweep. A uniform
    /// additive shift cannot invert relative order within a side.
    pub fn apply_price_impact(&mut self, shift: Decimal) {
        self.bids = std::mem::take(&mut self.bids)
            .into_iter()
            .map(|(Reverse(p), v)| (Reverse(p + shift), v))
            .collect();
        self.asks = std::mem::take(&mut self.asks)
            .into_iter()
            .map(|(p, v)| (p + shift, v))
            .collect();
    }

    /// Simulate a sweep without mutating the book
    ///
    /// `side` names the ladder consumed: `Ask` prices a buy, `Bid` prices a
    /// sell. Returns the average price per unit over what would execute,
    /// zero for zero volume or an empty side.
    pub fn estimate_execution_cost(&self, volume: i64, side: Side) -> Decimal {
        if volume <= 0 {
            return Decimal::ZERO;
        }

        let mut remaining = volume;
        let mut cost = Decimal::ZERO;
        let mut executed = 0i64;

        match side {
            Side::Ask => {
                for (&price, &level_volume) in &self.asks {
                    let take = remaining.min(level_volume);
                    cost += price * Decimal::from(take);
                    executed += take;
                    remaining -= take;
                    if remaining == 0 {
                        break;
                    }
                }
            }
            Side::Bid => {
                for (&Reverse(price), &level_volume) in &self.bids {
                    let take = remaining.min(level_volume);
                    cost += price * Decimal::from(take);
                    executed += take;
                    remaining -= take;
                    if remaining == 0 {
                        break;
                    }
                }
            }
        }

        average(cost, executed)
    }

    /// Total resting volume on one side
    pub fn depth_volume(&self, side: Side) -> i64 {
        match side {
            Side::Bid => self.bids.values().sum(),
            Side::Ask => self.asks.values().sum(),
        }
    }

    /// Snapshot of one side's levels in ladder order (best first)
    pub fn levels(&self, side: Side) -> Vec<PriceLevel> {
        match side {
            Side::Bid => self
                .bids
                .iter()
                .map(|(Reverse(p), v)| PriceLevel {
                    price: *p,
                    volume: *v,
                })
                .collect(),
            Side::Ask => self
                .asks
                .iter()
                .map(|(p, v)| PriceLevel {
                    price: *p,
                    volume: *v,
                })
                .collect(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

fn average(total: Decimal, volume: i64) -> Decimal {
    if volume > 0 {
        total / Decimal::from(volume)
    } else {
        Decimal::ZERO
    }
}

impl VolumeModel {
    /// Draw the volume for one level at the given depth index
    pub fn sample<R: Rng>(&self, depth: usize, rng: &mut R) -> i64 {
        match *self {
            VolumeModel::Fixed(volume) => volume,
            VolumeModel::Ramp { base, increment } => base + increment * depth as i64,
            VolumeModel::Random { min, max } => rng.gen_range(min..=max),
        }
    }
}
