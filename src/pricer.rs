//! Execution pricing strategies
//!
//! The campaign mixes two fill paths: a deterministic linear price-impact
//! formula and real sweeps against resting book liquidity. Both are kept as
//! independent strategies behind one trait, selectable per call site.

use rust_decimal::Decimal;

use crate::ledger::{PositionLedger, TraceLabel};
use crate::orderbook::{Fill, OrderBook, Side};

/// Trade direction for a priced fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

/// A pricing strategy: given a direction and volume, determine the execution
/// price and record the fill into the ledger
///
/// The returned fill carries the volume that actually executed, which may be
/// less than requested when book liquidity runs out.
pub trait Pricer {
    fn execute_fill(
        &mut self,
        direction: Direction,
        volume: i64,
        ledger: &mut PositionLedger,
        label: TraceLabel<'_>,
    ) -> Fill;
}

/// Prices fills by shifting the ledger's current price linearly with volume
///
/// Buys fill at the fully shifted price. Sells fill at the midpoint of the
/// shift and leave the price at the shifted end, so a sell's fill price sits
/// above where the market ends up.
#[derive(Debug, Clone)]
pub struct ImpactFormulaPricer {
    impact_per_share: Decimal,
}

impl ImpactFormulaPricer {
    pub fn new(impact_per_share: Decimal) -> Self {
        Self { impact_per_share }
    }
}

impl Pricer for ImpactFormulaPricer {
    fn execute_fill(
        &mut self,
        direction: Direction,
        volume: i64,
        ledger: &mut PositionLedger,
        label: TraceLabel<'_>,
    ) -> Fill {
        let total_impact = self.impact_per_share * Decimal::from(volume);
        let start_price = ledger.current_price();

        match direction {
            Direction::Buy => {
                let fill_price = start_price + total_impact;
                ledger.record_buy(volume, fill_price, label);
                Fill {
                    price: fill_price,
                    volume,
                }
            }
            Direction::Sell => {
                let fill_price = start_price - total_impact / Decimal::from(2);
                let end_price = start_price - total_impact;
                ledger.record_sell(volume, fill_price, label);
                ledger.set_current_price(end_price);
                Fill {
                    price: fill_price,
                    volume,
                }
            }
        }
    }
}

/// Prices fills by sweeping an owned order book
pub struct BookSweepPricer {
    book: OrderBook,
}

impl BookSweepPricer {
    pub fn new(book: OrderBook) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }
}

impl Pricer for BookSweepPricer {
    fn execute_fill(
        &mut self,
        direction: Direction,
        volume: i64,
        ledger: &mut PositionLedger,
        label: TraceLabel<'_>,
    ) -> Fill {
        let result = match direction {
            Direction::Buy => self.book.sweep_market_buy(volume),
            Direction::Sell => self.book.sweep_market_sell(volume),
        };

        // Nothing resting on the swept side: no fill, nothing to record
        if result.executed == 0 {
            return Fill {
                price: Decimal::ZERO,
                volume: 0,
            };
        }

        match direction {
            Direction::Buy => ledger.record_buy(result.executed, result.avg_price, label),
            Direction::Sell => ledger.record_sell(result.executed, result.avg_price, label),
        }

        Fill {
            price: result.avg_price,
            volume: result.executed,
        }
    }
}

// Used by the sweep pricer's callers to pick the ladder a direction consumes
impl Direction {
    pub fn consumed_side(self) -> Side {
        match self {
            Direction::Buy => Side::Ask,
            Direction::Sell => Side::Bid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LABEL: TraceLabel<'static> = TraceLabel::new("Test", "Fill");

    #[test]
    fn test_impact_buy_fills_at_shifted_price() {
        let mut ledger = PositionLedger::new(dec!(22.75));
        let mut pricer = ImpactFormulaPricer::new(dec!(0.000011));

        let fill = pricer.execute_fill(Direction::Buy, 10000, &mut ledger, LABEL);
        assert_eq!(fill.price, dec!(22.86));
        assert_eq!(fill.volume, 10000);
        assert_eq!(ledger.current_price(), dec!(22.86));
        assert_eq!(ledger.net_position(), 10000);
    }

    #[test]
    fn test_impact_sell_fills_at_midpoint_of_drop() {
        let mut ledger = PositionLedger::new(dec!(22.86));
        let mut pricer = ImpactFormulaPricer::new(dec!(0.000011));

        let fill = pricer.execute_fill(Direction::Sell, 20000, &mut ledger, LABEL);
        // Impact 0.22: fill halfway down, price ends at the bottom
        assert_eq!(fill.price, dec!(22.75));
        assert_eq!(ledger.current_price(), dec!(22.64));
        assert_eq!(ledger.report(dec!(22.64)).regular_sale_amount, dec!(22.75) * dec!(20000));
    }

    #[test]
    fn test_sweep_pricer_records_realized_average() {
        let mut book = OrderBook::new("PUM.DE");
        book.seed_with_volumes(dec!(22.75), dec!(0.01), &[10000; 10]);
        let mut pricer = BookSweepPricer::new(book);
        let mut ledger = PositionLedger::new(dec!(22.75));

        let fill = pricer.execute_fill(Direction::Buy, 15000, &mut ledger, LABEL);
        assert_eq!(fill.volume, 15000);
        assert_eq!(fill.price.round_dp(4), dec!(22.7633));
        assert_eq!(ledger.net_position(), 15000);
        assert_eq!(ledger.current_price(), fill.price);
        assert_eq!(
            pricer.book().levels(Side::Ask)[0].volume,
            5000
        );
    }

    #[test]
    fn test_sweep_pricer_partial_then_dry() {
        let mut book = OrderBook::new("PUM.DE");
        book.seed_with_volumes(dec!(22.75), dec!(0.01), &[4000]);
        let mut pricer = BookSweepPricer::new(book);
        let mut ledger = PositionLedger::new(dec!(22.75));

        let fill = pricer.execute_fill(Direction::Sell, 10000, &mut ledger, LABEL);
        assert_eq!(fill.volume, 4000);
        assert_eq!(fill.price, dec!(22.74));

        // Side is drained: a second attempt records nothing
        let report_before = ledger.report(dec!(22.74));
        let dry = pricer.execute_fill(Direction::Sell, 10000, &mut ledger, LABEL);
        assert_eq!(dry.volume, 0);
        assert_eq!(dry.price, Decimal::ZERO);
        assert_eq!(
            ledger.report(dec!(22.74)).shares_sold,
            report_before.shares_sold
        );
        assert_eq!(ledger.trace().len(), 1);
    }
}
