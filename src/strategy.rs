//! Scripted campaign sequencer
//!
//! Drives the four-phase script (accumulate, trap flush, impulse buy, exit)
//! against the position ledger, checking the stop-loss after every phase and
//! falling back to an emergency liquidation when it trips.

use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::StrategyConfig;
use crate::ledger::{MultiStepKind, PositionLedger, TraceLabel};
use crate::orderbook::{OrderBook, VolumeModel};
use crate::pricer::{BookSweepPricer, Direction, ImpactFormulaPricer, Pricer};

const IMPULSE_LOTS: u32 = 12;
const IMPULSE_LOT_SIZE: i64 = 10_000;
const STOP_ORDER_VOLUME: i64 = 50_000;
const EXIT_BLOCK_SIZE: i64 = 20_000;
/// Base position assumed by the emergency exit (the accumulation target)
const ESTIMATED_POSITION: i64 = 50_000;

/// The scripted multi-phase campaign
pub struct TradingStrategy<R: Rng> {
    config: StrategyConfig,
    rng: R,
    impact: ImpactFormulaPricer,
    sweep: BookSweepPricer,
}

impl<R: Rng> TradingStrategy<R> {
    /// Build the sequencer, seeding the liquidity-discovery book around the
    /// configured initial price
    pub fn new(config: StrategyConfig, mut rng: R) -> Self {
        let mut book = OrderBook::new(&config.instrument);
        book.seed(
            config.initial_price,
            config.book_levels,
            config.book_price_step,
            &VolumeModel::Ramp {
                base: 10_000,
                increment: 500,
            },
            &mut rng,
        );

        let impact = ImpactFormulaPricer::new(config.price_impact_per_share);
        let sweep = BookSweepPricer::new(book);
        Self {
            config,
            rng,
            impact,
            sweep,
        }
    }

    /// Run the campaign to completion
    pub fn run(&mut self, ledger: &mut PositionLedger) {
        let threshold = self.config.initial_price
            * (Decimal::ONE - self.config.stop_loss_percent / Decimal::from(100));
        info!(
            instrument = %self.config.instrument,
            initial_price = %self.config.initial_price,
            stop_loss_level = %threshold,
            "starting campaign"
        );
        if let (Ok(bid), Ok(ask)) = (self.sweep.book().best_bid(), self.sweep.book().best_ask()) {
            info!(best_bid = %bid, best_ask = %ask, "seeded book quotes");
        }

        self.accumulate(ledger);
        if self.stop_loss_hit(ledger, "accumulation") {
            self.emergency_exit(ledger);
            return;
        }

        if self.config.enable_trap_phase {
            self.trap_flush(ledger);
            if self.stop_loss_hit(ledger, "trap flush") {
                self.emergency_exit(ledger);
                return;
            }
        }

        self.impulse_buy(ledger);
        if self.stop_loss_hit(ledger, "impulse buy") {
            self.emergency_exit(ledger);
            return;
        }

        self.exit(ledger);
    }

    /// Phase 1: quiet accumulation in small passive lots
    fn accumulate(&mut self, ledger: &mut PositionLedger) {
        info!(
            lots = self.config.accumulation_lots,
            lot_size = self.config.accumulation_lot_size,
            "phase 1: hidden accumulation"
        );

        let quote = self.sweep.book().estimate_execution_cost(
            self.config.accumulation_lot_size,
            Direction::Buy.consumed_side(),
        );
        if quote > Decimal::ZERO {
            info!(avg_price = %quote, "book estimate for one lot");
        }

        let mut last_price = ledger.current_price();
        for _ in 0..self.config.accumulation_lots {
            let price = self.random_price(
                self.config.accumulation_price_min,
                self.config.accumulation_price_max,
            );
            ledger.record_buy(
                self.config.accumulation_lot_size,
                price,
                TraceLabel::new("Phase1", "PassiveBuy"),
            );
            last_price = price;
        }
        ledger.set_reference_price(last_price);
    }

    /// Phase 2: sell down to the trigger price, then buy the dip back
    fn trap_flush(&mut self, ledger: &mut PositionLedger) {
        let base_price = ledger.reference_price();
        let drop = base_price * self.config.trap_drop_percent / Decimal::from(100);
        let trigger_price = base_price - drop;

        // Volume needed to push the price down by `drop`, in round lots
        let shares_needed = (drop / self.config.price_impact_per_share)
            .ceil()
            .to_i64()
            .unwrap_or(0);
        let volume = ((shares_needed / 1000) * 1000).max(1000);

        info!(
            base = %base_price,
            trigger = %trigger_price,
            volume,
            "phase 2: trap flush"
        );

        ledger.set_current_price(base_price);
        ledger.multi_step_fill(
            MultiStepKind::TrapSell,
            volume,
            base_price,
            trigger_price,
            5,
            TraceLabel::new("Phase2", "TrapSell"),
        );
        ledger.multi_step_fill(
            MultiStepKind::TrapBuyback,
            volume,
            trigger_price,
            base_price,
            3,
            TraceLabel::new("Phase2", "TrapBuy"),
        );
    }

    /// Phase 3: lots of aggressive buys, then the counter-party stop orders
    /// sweep the peak
    fn impulse_buy(&mut self, ledger: &mut PositionLedger) {
        let rebound_price = ledger.reference_price();
        ledger.set_current_price(rebound_price);
        info!(from = %rebound_price, "phase 3: impulse buy");

        for lot in 1..=IMPULSE_LOTS {
            let fill = self.impact.execute_fill(
                Direction::Buy,
                IMPULSE_LOT_SIZE,
                ledger,
                TraceLabel::new("Phase3", "ImpulseBuy"),
            );
            info!(lot, price = %fill.price, "impulse lot filled");
        }

        let peak_price = ledger.current_price()
            + self.config.price_impact_per_share * Decimal::from(STOP_ORDER_VOLUME);
        ledger.record_stop_order_sale(
            STOP_ORDER_VOLUME,
            peak_price,
            TraceLabel::new("Phase3", "StopOrders"),
        );
        info!(peak = %peak_price, volume = STOP_ORDER_VOLUME, "stop orders bought from us at the peak");
    }

    /// Phase 4: liquidate the whole position in blocks
    fn exit(&mut self, ledger: &mut PositionLedger) {
        let start_price = ledger.current_price();
        let mut remaining = ledger.net_position().max(0);
        info!(portfolio = remaining, from = %start_price, "phase 4: exit");

        let mut step = 1;
        while remaining > 0 {
            let block = EXIT_BLOCK_SIZE.min(remaining);
            let fill = self.impact.execute_fill(
                Direction::Sell,
                block,
                ledger,
                TraceLabel::new("Phase4", "Exit"),
            );
            remaining -= block;
            info!(step, sold = block, price = %fill.price, remaining, "liquidation step");
            step += 1;

            if self.stop_loss_hit(ledger, "liquidation") {
                if remaining > 0 {
                    let fill = self.impact.execute_fill(
                        Direction::Sell,
                        remaining,
                        ledger,
                        TraceLabel::new("Phase4", "EmergencySell"),
                    );
                    info!(sold = remaining, price = %fill.price, "remainder dumped");
                }
                break;
            }
        }

        info!(from = %start_price, to = %ledger.current_price(), "liquidation complete");
    }

    /// Liquidate the estimated base position after a stop-loss: book
    /// liquidity first, the impact formula for whatever the book cannot
    /// absorb
    fn emergency_exit(&mut self, ledger: &mut PositionLedger) {
        warn!(position = ESTIMATED_POSITION, "emergency exit");

        let fill = self.sweep.execute_fill(
            Direction::Sell,
            ESTIMATED_POSITION,
            ledger,
            TraceLabel::new("Emergency", "BookSell"),
        );
        if fill.volume > 0 {
            info!(volume = fill.volume, price = %fill.price, "book liquidity absorbed");
        }

        let unfilled = ESTIMATED_POSITION - fill.volume;
        if unfilled > 0 {
            let fill = self.impact.execute_fill(
                Direction::Sell,
                unfilled,
                ledger,
                TraceLabel::new("Emergency", "ImpactSell"),
            );
            info!(volume = unfilled, price = %fill.price, "remainder liquidated by impact");
        }
    }

    fn stop_loss_hit(&self, ledger: &PositionLedger, after: &str) -> bool {
        let hit = ledger.should_stop_loss(self.config.initial_price, self.config.stop_loss_percent);
        if hit {
            warn!(after, price = %ledger.current_price(), "stop-loss triggered");
        }
        hit
    }

    fn random_price(&mut self, min: Decimal, max: Decimal) -> Decimal {
        let range = (max - min).to_f64().unwrap_or(0.0);
        let offset = Decimal::from_f64(self.rng.gen::<f64>() * range).unwrap_or(Decimal::ZERO);
        (min + offset).round_dp(2)
    }
}
