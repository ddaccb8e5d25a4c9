//! Position ledger: fill recording and PnL accounting
//!
//! Pricing is the caller's responsibility (a pricer or the order book);
//! every operation here takes an explicit price and volume.

use rust_decimal::Decimal;
use tracing::debug;

use super::{MultiStepKind, PositionStatus, ReportSummary, TraceLabel, TraceRecord};
use crate::orderbook::Fill;

/// Running totals for one campaign
///
/// Amounts and volumes only grow over the campaign; the ledger is never
/// reset mid-run. Stop-order sales are tracked apart from regular sells so
/// the report can split revenue, but both reduce the net position.
#[derive(Debug)]
pub struct PositionLedger {
    buy_amount: Decimal,
    sell_amount: Decimal,
    shares_bought: i64,
    shares_sold: i64,
    stop_order_amount: Decimal,
    stop_order_shares: i64,
    vwap_total: Decimal,
    vwap_volume: i64,
    current_price: Decimal,
    last_reference_price: Decimal,
    time_step: u32,
    trace: Vec<TraceRecord>,
}

impl PositionLedger {
    /// Create a ledger marked at the campaign's initial price
    pub fn new(initial_price: Decimal) -> Self {
        Self {
            buy_amount: Decimal::ZERO,
            sell_amount: Decimal::ZERO,
            shares_bought: 0,
            shares_sold: 0,
            stop_order_amount: Decimal::ZERO,
            stop_order_shares: 0,
            vwap_total: Decimal::ZERO,
            vwap_volume: 0,
            current_price: initial_price,
            last_reference_price: initial_price,
            time_step: 0,
            trace: Vec::new(),
        }
    }

    /// Record a buy fill
    ///
    /// Buys are the only fills that feed the VWAP.
    pub fn record_buy(&mut self, volume: i64, price: Decimal, label: TraceLabel<'_>) {
        debug_assert!(volume >= 0);
        let amount = Decimal::from(volume) * price;
        self.buy_amount += amount;
        self.shares_bought += volume;
        self.vwap_total += amount;
        self.vwap_volume += volume;
        self.current_price = price;
        self.push_trace(price, volume, label);
        debug!(volume, price = %price, "buy recorded");
    }

    /// Record a regular sell fill (excluded from VWAP)
    pub fn record_sell(&mut self, volume: i64, price: Decimal, label: TraceLabel<'_>) {
        debug_assert!(volume >= 0);
        self.sell_amount += Decimal::from(volume) * price;
        self.shares_sold += volume;
        self.current_price = price;
        self.push_trace(price, -volume, label);
        debug!(volume, price = %price, "sell recorded");
    }

    /// Record shares taken from the position by counter-party stop orders
    pub fn record_stop_order_sale(&mut self, volume: i64, price: Decimal, label: TraceLabel<'_>) {
        debug_assert!(volume >= 0);
        self.stop_order_amount += Decimal::from(volume) * price;
        self.stop_order_shares += volume;
        self.current_price = price;
        self.push_trace(price, volume, label);
        debug!(volume, price = %price, "stop-order sale recorded");
    }

    /// Record a multi-step trap fill
    ///
    /// Aggregate totals use the full `total_volume` at the midpoint of
    /// `start_price` and `end_price`. The trace gets `steps + 1` points at
    /// `start - ((start - end) / (steps + 1)) * i`, each carrying
    /// `total_volume / steps` shares with the division residual dropped, so
    /// the end price is approached but not reached and the traced volume
    /// need not sum to the aggregate. Returns the aggregate fill.
    pub fn multi_step_fill(
        &mut self,
        kind: MultiStepKind,
        total_volume: i64,
        start_price: Decimal,
        end_price: Decimal,
        steps: u32,
        label: TraceLabel<'_>,
    ) -> Fill {
        assert!(total_volume >= 0, "multi-step fill volume must be non-negative");
        assert!(steps > 0, "multi-step fill needs at least one step");

        let avg_price = (start_price + end_price) / Decimal::from(2);
        let step_volume = total_volume / i64::from(steps);
        let price_step = (start_price - end_price) / Decimal::from(steps + 1);

        for i in 0..=steps {
            let step_price = start_price - price_step * Decimal::from(i);
            self.push_trace(step_price, step_volume, label);
        }

        self.current_price = end_price;
        let amount = Decimal::from(total_volume) * avg_price;
        match kind {
            MultiStepKind::TrapSell => {
                self.sell_amount += amount;
                self.shares_sold += total_volume;
            }
            MultiStepKind::TrapBuyback => {
                self.buy_amount += amount;
                self.shares_bought += total_volume;
                self.vwap_total += amount;
                self.vwap_volume += total_volume;
            }
        }
        debug!(?kind, total_volume, avg_price = %avg_price, "multi-step fill recorded");

        Fill {
            price: avg_price,
            volume: total_volume,
        }
    }

    /// Whether the current price has fallen to the stop-loss threshold
    pub fn should_stop_loss(&self, initial_price: Decimal, stop_loss_percent: Decimal) -> bool {
        let threshold = initial_price * (Decimal::ONE - stop_loss_percent / Decimal::from(100));
        self.current_price <= threshold
    }

    /// Compute the full campaign summary at the given mark price
    pub fn report(&self, current_price: Decimal) -> ReportSummary {
        let total_received = self.sell_amount + self.stop_order_amount;
        let net_pnl = total_received - self.buy_amount;
        let shares_sold_total = self.shares_sold + self.stop_order_shares;
        let net_position = self.shares_bought - shares_sold_total;

        let avg_buy_price = if self.shares_bought > 0 {
            self.buy_amount / Decimal::from(self.shares_bought)
        } else {
            Decimal::ZERO
        };
        let avg_sell_price = if shares_sold_total > 0 {
            total_received / Decimal::from(shares_sold_total)
        } else {
            Decimal::ZERO
        };

        let status = match net_position {
            p if p > 0 => {
                let unrealized_value = Decimal::from(p) * current_price;
                let total_pnl =
                    net_pnl + unrealized_value - Decimal::from(p) * avg_buy_price;
                PositionStatus::Long {
                    unrealized_value,
                    total_pnl,
                }
            }
            0 => PositionStatus::Flat,
            _ => PositionStatus::Anomaly,
        };

        ReportSummary {
            shares_bought: self.shares_bought,
            shares_sold: self.shares_sold,
            stop_order_shares: self.stop_order_shares,
            shares_sold_total,
            net_position,
            avg_buy_price,
            avg_sell_price,
            total_spent: self.buy_amount,
            total_received,
            regular_sale_amount: self.sell_amount,
            stop_order_amount: self.stop_order_amount,
            net_pnl,
            vwap: self.vwap(),
            status,
        }
    }

    /// Volume-weighted average price of all buy fills, zero before the first
    pub fn vwap(&self) -> Decimal {
        if self.vwap_volume > 0 {
            self.vwap_total / Decimal::from(self.vwap_volume)
        } else {
            Decimal::ZERO
        }
    }

    /// Bought minus regular-sold minus stop-sold shares
    pub fn net_position(&self) -> i64 {
        self.shares_bought - self.shares_sold - self.stop_order_shares
    }

    pub fn current_price(&self) -> Decimal {
        self.current_price
    }

    /// Move the mark price without recording a fill (administrative resets
    /// between phases)
    pub fn set_current_price(&mut self, price: Decimal) {
        self.current_price = price;
    }

    /// Reference price pinned by the sequencer (e.g. the last accumulation
    /// fill) for later phases to return to
    pub fn reference_price(&self) -> Decimal {
        self.last_reference_price
    }

    pub fn set_reference_price(&mut self, price: Decimal) {
        self.last_reference_price = price;
    }

    /// The per-fill time-series trace, in recording order
    pub fn trace(&self) -> &[TraceRecord] {
        &self.trace
    }

    fn push_trace(&mut self, price: Decimal, volume: i64, label: TraceLabel<'_>) {
        self.time_step += 1;
        self.trace.push(TraceRecord {
            time_step: self.time_step,
            price,
            volume,
            phase: label.phase.to_string(),
            action: label.action.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LABEL: TraceLabel<'static> = TraceLabel::new("Phase1", "PassiveBuy");

    #[test]
    fn test_vwap_is_weighted_average_of_buys() {
        let mut ledger = PositionLedger::new(dec!(22.75));
        ledger.record_buy(1000, dec!(23.00), LABEL);
        ledger.record_buy(3000, dec!(23.40), LABEL);

        // (1000 * 23.00 + 3000 * 23.40) / 4000
        assert_eq!(ledger.vwap(), dec!(23.30));
    }

    #[test]
    fn test_sells_do_not_move_vwap() {
        let mut ledger = PositionLedger::new(dec!(22.75));
        ledger.record_buy(1000, dec!(23.00), LABEL);
        let vwap_before = ledger.vwap();

        ledger.record_sell(500, dec!(24.00), TraceLabel::new("Phase4", "Exit"));
        ledger.record_stop_order_sale(200, dec!(25.00), TraceLabel::new("Phase3", "StopOrders"));
        assert_eq!(ledger.vwap(), vwap_before);
    }

    #[test]
    fn test_stop_sales_tracked_apart_but_reduce_position() {
        let mut ledger = PositionLedger::new(dec!(22.75));
        ledger.record_buy(1000, dec!(10.00), LABEL);
        ledger.record_sell(500, dec!(12.00), TraceLabel::new("Phase4", "Exit"));
        ledger.record_stop_order_sale(200, dec!(13.00), TraceLabel::new("Phase3", "StopOrders"));

        assert_eq!(ledger.net_position(), 300);

        let report = ledger.report(dec!(11.00));
        assert_eq!(report.regular_sale_amount, dec!(6000));
        assert_eq!(report.stop_order_amount, dec!(2600));
        assert_eq!(report.total_received, dec!(8600));
        assert_eq!(report.net_pnl, dec!(-1400));
        assert_eq!(report.avg_buy_price, dec!(10.00));
        assert_eq!(report.avg_sell_price, dec!(8600) / dec!(700));
        match report.status {
            PositionStatus::Long {
                unrealized_value,
                total_pnl,
            } => {
                assert_eq!(unrealized_value, dec!(3300));
                // -1400 + 3300 - 300 * 10.00
                assert_eq!(total_pnl, dec!(-1100));
            }
            other => panic!("expected a long position, got {other:?}"),
        }
    }

    #[test]
    fn test_report_with_zero_fills_is_all_zero_and_flat() {
        let ledger = PositionLedger::new(dec!(22.75));
        let report = ledger.report(dec!(22.75));

        assert_eq!(report.shares_bought, 0);
        assert_eq!(report.shares_sold_total, 0);
        assert_eq!(report.net_position, 0);
        assert_eq!(report.total_spent, Decimal::ZERO);
        assert_eq!(report.total_received, Decimal::ZERO);
        assert_eq!(report.net_pnl, Decimal::ZERO);
        assert_eq!(report.vwap, Decimal::ZERO);
        assert_eq!(report.status, PositionStatus::Flat);
    }

    #[test]
    fn test_overselling_flags_anomaly() {
        let mut ledger = PositionLedger::new(dec!(22.75));
        ledger.record_buy(1000, dec!(23.00), LABEL);
        ledger.record_sell(800, dec!(23.10), TraceLabel::new("Phase4", "Exit"));
        ledger.record_stop_order_sale(500, dec!(23.20), TraceLabel::new("Phase3", "StopOrders"));

        let report = ledger.report(dec!(23.00));
        assert_eq!(report.net_position, -300);
        assert!(report.is_anomalous());
    }

    #[test]
    fn test_stop_loss_threshold() {
        let mut ledger = PositionLedger::new(dec!(22.75));

        // Threshold at 3% below 22.75 is 22.0675
        ledger.set_current_price(dec!(22.10));
        assert!(!ledger.should_stop_loss(dec!(22.75), dec!(3.0)));

        ledger.set_current_price(dec!(22.00));
        assert!(ledger.should_stop_loss(dec!(22.75), dec!(3.0)));
    }

    #[test]
    fn test_trap_sell_trace_and_aggregate() {
        let mut ledger = PositionLedger::new(dec!(23.30));
        let fill = ledger.multi_step_fill(
            MultiStepKind::TrapSell,
            10000,
            dec!(23.30),
            dec!(23.18),
            5,
            TraceLabel::new("Phase2", "TrapSell"),
        );

        assert_eq!(fill.price, dec!(23.24));
        assert_eq!(fill.volume, 10000);
        assert_eq!(ledger.report(dec!(23.18)).regular_sale_amount, dec!(232400));
        assert_eq!(ledger.current_price(), dec!(23.18));

        let prices: Vec<Decimal> = ledger.trace().iter().map(|r| r.price).collect();
        assert_eq!(
            prices,
            vec![
                dec!(23.30),
                dec!(23.28),
                dec!(23.26),
                dec!(23.24),
                dec!(23.22),
                dec!(23.20)
            ]
        );
        assert!(ledger.trace().iter().all(|r| r.volume == 2000));
    }

    #[test]
    fn test_trap_buyback_walks_price_up_and_feeds_vwap() {
        let mut ledger = PositionLedger::new(dec!(23.18));
        ledger.multi_step_fill(
            MultiStepKind::TrapBuyback,
            9000,
            dec!(23.18),
            dec!(23.30),
            3,
            TraceLabel::new("Phase2", "TrapBuy"),
        );

        let prices: Vec<Decimal> = ledger.trace().iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![dec!(23.18), dec!(23.21), dec!(23.24), dec!(23.27)]);
        assert_eq!(ledger.vwap(), dec!(23.24));
        assert_eq!(ledger.net_position(), 9000);
    }

    #[test]
    fn test_trace_volume_does_not_sum_to_aggregate() {
        // Known quirk: per-step trace volume truncates the division while
        // the aggregate books the full volume once, so the trace totals
        // drift from the booked volume.
        let mut ledger = PositionLedger::new(dec!(23.30));
        ledger.multi_step_fill(
            MultiStepKind::TrapSell,
            10001,
            dec!(23.30),
            dec!(23.18),
            5,
            TraceLabel::new("Phase2", "TrapSell"),
        );

        let traced: i64 = ledger.trace().iter().map(|r| r.volume).sum();
        assert_eq!(traced, 2000 * 6);
        assert_eq!(ledger.report(dec!(23.18)).shares_sold, 10001);
        assert_ne!(traced, 10001);
    }

    #[test]
    fn test_trace_records_carry_labels_and_steps() {
        let mut ledger = PositionLedger::new(dec!(22.75));
        ledger.record_buy(1000, dec!(23.00), LABEL);
        ledger.record_sell(400, dec!(23.10), TraceLabel::new("Phase4", "Exit"));

        let trace = ledger.trace();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].time_step, 1);
        assert_eq!(trace[0].phase, "Phase1");
        assert_eq!(trace[0].action, "PassiveBuy");
        assert_eq!(trace[0].volume, 1000);
        assert_eq!(trace[1].time_step, 2);
        assert_eq!(trace[1].volume, -400);
    }

    #[test]
    #[should_panic(expected = "at least one step")]
    fn test_zero_steps_is_a_caller_bug() {
        let mut ledger = PositionLedger::new(dec!(22.75));
        ledger.multi_step_fill(
            MultiStepKind::TrapSell,
            1000,
            dec!(23.30),
            dec!(23.18),
            0,
            TraceLabel::new("Phase2", "TrapSell"),
        );
    }
}
