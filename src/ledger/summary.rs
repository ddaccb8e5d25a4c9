//! Campaign report summary types

use rust_decimal::Decimal;
use serde::Serialize;

/// End-of-campaign position status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionStatus {
    /// Shares still held; carries the mark-to-market component
    Long {
        unrealized_value: Decimal,
        /// Realized PnL plus unrealized value minus the cost basis of the
        /// remaining shares
        total_pnl: Decimal,
    },
    /// Fully liquidated, no unrealized component
    Flat,
    /// More shares sold than bought: an inconsistency in the volumes fed to
    /// the ledger, surfaced instead of being priced as a short position
    Anomaly,
}

/// Full trading summary computed by [`super::PositionLedger::report`]
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub shares_bought: i64,
    /// Regular sells only
    pub shares_sold: i64,
    /// Involuntary sales into counter-party stop orders
    pub stop_order_shares: i64,
    pub shares_sold_total: i64,
    pub net_position: i64,
    pub avg_buy_price: Decimal,
    /// Averaged over regular and stop-order sales combined
    pub avg_sell_price: Decimal,
    pub total_spent: Decimal,
    pub total_received: Decimal,
    pub regular_sale_amount: Decimal,
    pub stop_order_amount: Decimal,
    /// Realized: total received minus total spent
    pub net_pnl: Decimal,
    /// Buy-side fills only
    pub vwap: Decimal,
    pub status: PositionStatus,
}

impl ReportSummary {
    pub fn is_anomalous(&self) -> bool {
        matches!(self.status, PositionStatus::Anomaly)
    }
}
