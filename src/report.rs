//! Report rendering and file output
//!
//! Turns a [`ReportSummary`] into the human-readable campaign log and the
//! fill trace into a time-series CSV. The core hands over plain records;
//! the formats live here.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::ledger::{PositionStatus, ReportSummary, TraceRecord};

/// Render the summary as the campaign log lines
pub fn render_summary(summary: &ReportSummary) -> Vec<String> {
    let mut lines = vec![
        "=== TRADING SUMMARY ===".to_string(),
        format!("Total Shares Bought: {}", summary.shares_bought),
        format!("Total Shares Sold (regular): {}", summary.shares_sold),
        format!("Stop Order Sales: {}", summary.stop_order_shares),
        format!("Total Shares Sold (all): {}", summary.shares_sold_total),
        format!("Net Position: {} shares", summary.net_position),
        format!("Average Buy Price: {:.4}", summary.avg_buy_price),
        format!("Average Sell Price: {:.4}", summary.avg_sell_price),
        format!("Total Money Spent: {:.2} EUR", summary.total_spent),
        format!("Total Money Received: {:.2} EUR", summary.total_received),
        format!("  - Regular Sales: {:.2} EUR", summary.regular_sale_amount),
        format!("  - Stop Order Sales: {:.2} EUR", summary.stop_order_amount),
        format!("Net P&L: {:.2} EUR", summary.net_pnl),
        format!("Final VWAP: {:.2}", summary.vwap),
    ];

    match summary.status {
        PositionStatus::Long {
            unrealized_value,
            total_pnl,
        } => {
            lines.push(format!("Unrealized Position Value: {unrealized_value:.2} EUR"));
            lines.push(format!("Total P&L (including unrealized): {total_pnl:.2} EUR"));
        }
        PositionStatus::Flat => {
            lines.push("Position fully liquidated - No unrealized P&L".to_string());
        }
        PositionStatus::Anomaly => {
            lines.push("Negative position detected - Check calculations!".to_string());
        }
    }

    lines
}

/// Write `simulation_log.txt` and `price_history.csv` into `dir`
pub fn write_report(dir: &Path, summary: &ReportSummary, trace: &[TraceRecord]) -> Result<()> {
    let log_path = dir.join("simulation_log.txt");
    let mut contents = render_summary(summary).join("\n");
    contents.push('\n');
    fs::write(&log_path, contents)?;

    let csv_path = dir.join("price_history.csv");
    let mut writer = csv::Writer::from_path(&csv_path)?;
    for record in trace {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(log = %log_path.display(), csv = %csv_path.display(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{PositionLedger, TraceLabel};
    use rust_decimal_macros::dec;

    fn sample_ledger() -> PositionLedger {
        let mut ledger = PositionLedger::new(dec!(22.75));
        ledger.record_buy(1000, dec!(23.00), TraceLabel::new("Phase1", "PassiveBuy"));
        ledger.record_sell(400, dec!(23.10), TraceLabel::new("Phase4", "Exit"));
        ledger
    }

    #[test]
    fn test_render_long_position() {
        let ledger = sample_ledger();
        let lines = render_summary(&ledger.report(dec!(23.00)));

        assert_eq!(lines[0], "=== TRADING SUMMARY ===");
        assert!(lines.iter().any(|l| l == "Total Shares Bought: 1000"));
        assert!(lines.iter().any(|l| l == "Net Position: 600 shares"));
        assert!(lines.iter().any(|l| l.starts_with("Unrealized Position Value: 13800.00")));
    }

    #[test]
    fn test_render_anomaly_line() {
        let mut ledger = PositionLedger::new(dec!(22.75));
        ledger.record_sell(400, dec!(23.10), TraceLabel::new("Phase4", "Exit"));
        let lines = render_summary(&ledger.report(dec!(23.00)));

        assert!(lines
            .iter()
            .any(|l| l == "Negative position detected - Check calculations!"));
    }

    #[test]
    fn test_write_report_files() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = sample_ledger();
        write_report(dir.path(), &ledger.report(dec!(23.00)), ledger.trace()).unwrap();

        let log = fs::read_to_string(dir.path().join("simulation_log.txt")).unwrap();
        assert!(log.starts_with("=== TRADING SUMMARY ==="));

        let csv = fs::read_to_string(dir.path().join("price_history.csv")).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("time_step,price,volume,phase,action"));
        assert_eq!(lines.next(), Some("1,23.00,1000,Phase1,PassiveBuy"));
        assert_eq!(lines.next(), Some("2,23.10,-400,Phase4,Exit"));
    }
}
