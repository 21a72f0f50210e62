//! The per-bar execution simulator.
//!
//! Owns all mutable run state: position, cooldown, peak equity, circuit
//! breaker, and the fill RNG. One instance simulates exactly one run over one
//! window; orchestration layers construct a fresh instance per window so no
//! state leaks across evaluations.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SimulationConfig;
use crate::domain::{Bar, EquityCurvePoint, Position, Quote, Trade, TradeSide};
use crate::error::{ConfigError, InvariantError};
use crate::quoting::{MarketState, QuoteProvider};

use super::fills::execution_probability;
use super::overlays::{self, StepOverlays};
use super::volatility::RollingVolatility;

/// Tolerance on the equity accounting identity.
pub const EQUITY_TOLERANCE: f64 = 1e-6;

/// Price penalty on a hard-inventory-cap liquidation (2% through mid).
pub const HARD_CAP_LIQUIDATION_SLIPPAGE: f64 = 0.02;

/// Price penalty on a drawdown-halt liquidation (0.5% through mid).
pub const HALT_LIQUIDATION_SLIPPAGE: f64 = 0.005;

/// Completed run output: the equity curve, the trade ledger, and the final
/// account state.
#[derive(Debug, Clone)]
pub struct SimRun {
    pub equity_curve: Vec<EquityCurvePoint>,
    pub trades: Vec<Trade>,
    pub final_position: Position,
    pub halted: bool,
}

/// Deterministic, stateful per-bar execution and risk simulator.
pub struct ExecutionSimulator {
    config: SimulationConfig,
    rng: StdRng,
    position: Position,
    vol: RollingVolatility,
    cooldown_remaining: u32,
    peak_equity: f64,
    halted: bool,
    base_order_qty: Option<f64>,
    bar_index: usize,
    equity_curve: Vec<EquityCurvePoint>,
    trades: Vec<Trade>,
}

impl ExecutionSimulator {
    /// Validate the configuration and initialize the account.
    pub fn new(config: SimulationConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let position = Position::new(config.initial_capital);
        let peak_equity = config.initial_capital;
        let vol = RollingVolatility::new(config.volatility_window);
        Ok(Self {
            config,
            rng,
            position,
            vol,
            cooldown_remaining: 0,
            peak_equity,
            halted: false,
            base_order_qty: None,
            bar_index: 0,
            equity_curve: Vec::new(),
            trades: Vec::new(),
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn equity_curve(&self) -> &[EquityCurvePoint] {
        &self.equity_curve
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// True once the hard drawdown breaker has fired; entries stay disabled
    /// for the remainder of the run.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Advance one bar, asking `provider` for this step's quote.
    ///
    /// Returns the trades executed on this bar (usually empty or one fill;
    /// a forced liquidation can add a second).
    pub fn step(
        &mut self,
        bar: &Bar,
        provider: &mut dyn QuoteProvider,
    ) -> Result<Vec<Trade>, InvariantError> {
        self.advance(bar, |sim, state| {
            if sim.halted {
                None
            } else {
                provider.quote(state)
            }
        })
    }

    /// Advance one bar with an externally supplied quote.
    ///
    /// Exposed for tests and custom drivers; the quote is ignored while
    /// halted, exactly as a provider's would be.
    pub fn step_with_quote(
        &mut self,
        bar: &Bar,
        quote: Option<Quote>,
    ) -> Result<Vec<Trade>, InvariantError> {
        self.advance(bar, |sim, _state| if sim.halted { None } else { quote })
    }

    /// Consume the simulator, yielding the completed run.
    pub fn finish(self) -> SimRun {
        SimRun {
            equity_curve: self.equity_curve,
            trades: self.trades,
            final_position: self.position,
            halted: self.halted,
        }
    }

    // ─── Step internals ──────────────────────────────────────────────

    fn advance(
        &mut self,
        bar: &Bar,
        quote_fn: impl FnOnce(&Self, &MarketState) -> Option<Quote>,
    ) -> Result<Vec<Trade>, InvariantError> {
        let mid = bar.mid_price;
        let sample = self.vol.update(mid);

        let base_qty = *self
            .base_order_qty
            .get_or_insert_with(|| self.config.base_order_qty(mid));
        let soft_cap_units = self.config.max_inventory_soft * base_qty;
        let hard_cap_units = self.config.max_inventory_hard * base_qty;

        let equity = self.position.equity(mid);
        self.peak_equity = self.peak_equity.max(equity);
        let overlays = overlays::compute(
            &self.config,
            mid,
            sample.volatility,
            sample.return_frac,
            equity,
            self.peak_equity,
            soft_cap_units,
        );

        let mut executed = Vec::new();

        // Hard drawdown breach: flatten at a penalty price and halt entries
        // for the remainder of the run.
        if overlays.hard_stop && !self.halted {
            self.halted = true;
            if !self.position.is_flat() {
                executed.push(self.liquidate(bar, HALT_LIQUIDATION_SLIPPAGE));
            }
        }

        let state = MarketState {
            timestamp: bar.timestamp,
            bar_index: self.bar_index,
            mid_price: mid,
            volatility: sample.volatility,
            inventory_qty: self.position.inventory_qty,
            spread_constraint: overlays.effective_spread_constraint,
        };
        let quote = quote_fn(self, &state);

        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        } else if !self.halted {
            if let Some(quote) = quote {
                executed.extend(self.apply_quote(bar, &overlays, base_qty, &quote));
            }
        }

        // The hard inventory cap is unconditional: it fires even while the
        // circuit breaker has everything else shut off.
        if !self.position.is_flat() && self.position.inventory_qty.abs() >= hard_cap_units {
            executed.push(self.liquidate(bar, HARD_CAP_LIQUIDATION_SLIPPAGE));
        }

        self.record_equity(bar)?;
        self.bar_index += 1;
        self.trades.extend(executed.iter().cloned());
        Ok(executed)
    }

    /// Fill-test a quote against this bar and execute any resulting trades.
    fn apply_quote(
        &mut self,
        bar: &Bar,
        overlays: &StepOverlays,
        base_qty: f64,
        quote: &Quote,
    ) -> Vec<Trade> {
        if !quote.is_sane() {
            return Vec::new();
        }
        let mid = bar.mid_price;

        // Edge filter: the gross spread must clear two fee legs plus the
        // effective minimum edge.
        let net_edge_bps = (quote.spread_frac(mid) - 2.0 * self.config.fee_rate) * 10_000.0;
        if overlays.effective_min_edge_bps > 0.0 && net_edge_bps < overlays.effective_min_edge_bps
        {
            return Vec::new();
        }

        let bid_prob = execution_probability(
            quote.bid_price,
            mid,
            TradeSide::Buy,
            bar.low,
            bar.high,
            self.config.execution_sensitivity,
        );
        let ask_prob = execution_probability(
            quote.ask_price,
            mid,
            TradeSide::Sell,
            bar.low,
            bar.high,
            self.config.execution_sensitivity,
        );
        // Both probabilities are always drawn, in a fixed order, so the RNG
        // stream is independent of which filters fire afterwards.
        let mut bid_executed = self.rng.gen::<f64>() < bid_prob;
        let mut ask_executed = self.rng.gen::<f64>() < ask_prob;

        // Dual fill: drop the side that would grow |inventory|.
        if bid_executed && ask_executed {
            let inv = self.position.inventory_qty;
            if inv > 0.0 {
                bid_executed = false;
            } else if inv < 0.0 {
                ask_executed = false;
            } else if self.rng.gen::<f64>() < 0.5 {
                ask_executed = false;
            } else {
                bid_executed = false;
            }
        }

        let inv = self.position.inventory_qty;
        if inv >= overlays.effective_soft_cap {
            bid_executed = false;
        }
        if inv <= -overlays.effective_soft_cap {
            ask_executed = false;
        }
        if overlays.adverse_buy_block {
            bid_executed = false;
        }
        if overlays.adverse_sell_block && inv <= 0.0 {
            ask_executed = false;
        }

        let mut out = Vec::new();
        if bid_executed {
            let qty = self.order_qty(
                TradeSide::Buy,
                quote.bid_price,
                quote.bid_size,
                base_qty,
                overlays.effective_soft_cap,
            );
            if qty >= self.config.min_order_qty {
                out.push(self.execute(bar, TradeSide::Buy, quote.bid_price, qty, false));
                self.cooldown_remaining = self.config.cooldown_bars;
            }
        }
        if ask_executed {
            let qty = self.order_qty(
                TradeSide::Sell,
                quote.ask_price,
                quote.ask_size,
                base_qty,
                overlays.effective_soft_cap,
            );
            if qty >= self.config.min_order_qty {
                out.push(self.execute(bar, TradeSide::Sell, quote.ask_price, qty, false));
                self.cooldown_remaining = self.config.cooldown_bars;
            }
        }
        out
    }

    /// Size one order: base quantity capped by quoted size, buy affordability,
    /// and the soft-cap taper on the accumulating side.
    fn order_qty(
        &self,
        side: TradeSide,
        price: f64,
        quote_size: f64,
        base_qty: f64,
        effective_soft_cap: f64,
    ) -> f64 {
        let mut qty = base_qty.min(quote_size).min(self.config.max_order_qty);
        if side == TradeSide::Buy {
            let affordable =
                (self.position.cash / (price * (1.0 + self.config.fee_rate)).max(1e-9)).max(0.0);
            qty = qty.min(affordable);
        }

        let inv = self.position.inventory_qty;
        let dir = match side {
            TradeSide::Buy => 1.0,
            TradeSide::Sell => -1.0,
        };
        if inv * dir >= 0.0 {
            // Accumulating: taper linearly to zero at the soft cap.
            let scale = (1.0 - inv.abs() / effective_soft_cap).clamp(0.0, 1.0);
            qty *= scale;
        }
        qty
    }

    fn execute(
        &mut self,
        bar: &Bar,
        side: TradeSide,
        price: f64,
        quantity: f64,
        liquidation_flag: bool,
    ) -> Trade {
        let fee = (price * quantity).abs() * self.config.fee_rate;
        self.position.apply(side, price, quantity, fee);
        Trade {
            timestamp: bar.timestamp,
            side,
            price,
            quantity,
            fee,
            liquidation_flag,
            mid_price: bar.mid_price,
            inventory_after: self.position.inventory_qty,
        }
    }

    /// Flatten the book at mid adjusted by `slippage_pct` against the
    /// position. Mandatory wherever invoked — never filtered or skipped.
    fn liquidate(&mut self, bar: &Bar, slippage_pct: f64) -> Trade {
        let inv = self.position.inventory_qty;
        let (side, price) = if inv > 0.0 {
            (TradeSide::Sell, bar.mid_price * (1.0 - slippage_pct))
        } else {
            (TradeSide::Buy, bar.mid_price * (1.0 + slippage_pct))
        };
        self.execute(bar, side, price, inv.abs(), true)
    }

    /// Mark equity, extend the curve, and verify the accounting identity
    /// against the PnL decomposition.
    fn record_equity(&mut self, bar: &Bar) -> Result<(), InvariantError> {
        let mid = bar.mid_price;
        let identity = self.position.equity(mid);
        let decomposed = self.position.initial_capital()
            + self.position.realized_pnl
            + self.position.unrealized_pnl(mid)
            - self.position.fees_paid;

        if (identity - decomposed).abs() >= EQUITY_TOLERANCE {
            return Err(InvariantError {
                bar_index: self.bar_index,
                identity_equity: identity,
                decomposed_equity: decomposed,
                cash: self.position.cash,
                inventory_qty: self.position.inventory_qty,
                mid_price: mid,
                avg_entry_price: self.position.avg_entry_price,
                realized_pnl: self.position.realized_pnl,
                fees_paid: self.position.fees_paid,
            });
        }

        let point = EquityCurvePoint::next(self.peak_equity, bar.timestamp, identity);
        self.peak_equity = point.peak_equity;
        self.equity_curve.push(point);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rand::SeedableRng;

    fn ts(i: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap() + chrono::Duration::minutes(i as i64)
    }

    fn sim(config: SimulationConfig) -> ExecutionSimulator {
        ExecutionSimulator::new(config, StdRng::seed_from_u64(42)).unwrap()
    }

    fn crossing_quote(bar: &Bar) -> Quote {
        // Both sides through mid: fills at the 0.95 cap with a wide edge.
        Quote {
            bid_price: bar.mid_price * 1.01,
            ask_price: bar.mid_price * 1.02,
            bid_size: 100.0,
            ask_size: 100.0,
            timestamp: bar.timestamp,
        }
    }

    #[test]
    fn absent_quote_is_a_no_op_step() {
        let mut sim = sim(SimulationConfig::default());
        let bar = Bar::from_mid(ts(0), 100.0);
        let trades = sim.step_with_quote(&bar, None).unwrap();
        assert!(trades.is_empty());
        assert_eq!(sim.equity_curve().len(), 1);
        assert!((sim.equity_curve()[0].equity - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_config_rejected_at_construction() {
        let config = SimulationConfig {
            initial_capital: -1.0,
            ..Default::default()
        };
        assert!(ExecutionSimulator::new(config, StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn cooldown_suppresses_follow_up_fills() {
        let config = SimulationConfig {
            cooldown_bars: 10,
            min_edge_bps: 0.0,
            adverse_return_bps: 0.0,
            ..Default::default()
        };
        let mut sim = sim(config);
        let mut fills = 0;
        for i in 0..8 {
            let bar = Bar::new(ts(i), 100.0, 101.0, 99.0, 100.0, 1.0);
            let quote = crossing_quote(&bar);
            fills += sim.step_with_quote(&bar, Some(quote)).unwrap().len();
        }
        // A window shorter than the cooldown admits at most one fill.
        assert!(fills <= 1);
    }

    #[test]
    fn hard_cap_liquidates_within_the_same_step() {
        // A soft cap above one base order with the hard cap below it: the
        // first fill jumps straight past the hard cap and must be unwound
        // in the same step.
        let config = SimulationConfig {
            max_inventory_soft: 0.5,
            max_inventory_hard: 0.5,
            cooldown_bars: 0,
            min_edge_bps: 0.0,
            adverse_return_bps: 0.0,
            ..Default::default()
        };
        let hard_units = config.max_inventory_hard * config.base_order_qty(100.0);
        let mut sim = sim(config);
        for i in 0..50 {
            let bar = Bar::new(ts(i), 100.0, 101.0, 99.0, 100.0, 1.0);
            let quote = crossing_quote(&bar);
            let trades = sim.step_with_quote(&bar, Some(quote)).unwrap();
            if trades.iter().any(|t| t.liquidation_flag) {
                // Liquidation restored the bound before the step completed.
                assert!(sim.position().inventory_qty.abs() < hard_units);
                return;
            }
            assert!(sim.position().inventory_qty.abs() < hard_units + 1e-9);
        }
        panic!("expected a hard-cap liquidation within 50 bars");
    }

    #[test]
    fn drawdown_halt_liquidates_and_blocks_entries() {
        // High-exposure config so a price gap can actually move equity 40%.
        let config = SimulationConfig {
            drawdown_soft: 0.10,
            drawdown_hard: 0.40,
            cooldown_bars: 0,
            min_edge_bps: 0.0,
            adverse_return_bps: 0.0,
            order_notional_pct: 0.5,
            max_order_qty: 100.0,
            max_inventory_soft: 4.0,
            max_inventory_hard: 8.0,
            ..Default::default()
        };
        let mut sim = sim(config);

        // Accumulate some long inventory near 100.
        for i in 0..20 {
            let bar = Bar::new(ts(i), 100.0, 101.0, 99.0, 100.0, 1.0);
            let quote = Quote {
                bid_price: 100.5,
                ask_price: 200.0,
                bid_size: 100.0,
                ask_size: 0.0, // ask side sized to zero: accumulate only
                timestamp: bar.timestamp,
            };
            sim.step_with_quote(&bar, Some(quote)).unwrap();
        }
        assert!(sim.position().inventory_qty > 0.0);

        // Gap down 50%: drawdown breaches the hard line on the gap bar.
        let gap_bar = Bar::from_mid(ts(30), 50.0);
        let trades = sim.step_with_quote(&gap_bar, None).unwrap();
        assert!(trades.iter().any(|t| t.liquidation_flag));
        assert!(sim.is_halted());
        assert!(sim.position().is_flat());

        // Entries stay off for the rest of the run.
        for i in 31..40 {
            let bar = Bar::from_mid(ts(i), 50.0);
            let quote = crossing_quote(&bar);
            let trades = sim.step_with_quote(&bar, Some(quote)).unwrap();
            assert!(trades.is_empty());
        }
    }

    #[test]
    fn identical_seeds_reproduce_identical_ledgers() {
        let config = SimulationConfig {
            min_edge_bps: 0.0,
            adverse_return_bps: 0.0,
            cooldown_bars: 1,
            ..Default::default()
        };
        let run = |seed: u64| {
            let mut sim =
                ExecutionSimulator::new(config.clone(), StdRng::seed_from_u64(seed)).unwrap();
            let mut mid = 100.0;
            for i in 0..60 {
                mid *= if i % 3 == 0 { 1.002 } else { 0.999 };
                let bar = Bar::new(ts(i), mid, mid * 1.01, mid * 0.99, mid, 1.0);
                let quote = Quote::symmetric(bar.timestamp, mid, mid * 0.004, 100.0);
                sim.step_with_quote(&bar, Some(quote)).unwrap();
            }
            sim.finish()
        };
        let a = run(7);
        let b = run(7);
        let c = run(8);
        assert_eq!(a.trades, b.trades);
        assert_eq!(a.equity_curve, b.equity_curve);
        // A different seed should diverge on this quote stream.
        assert_ne!(a.trades, c.trades);
    }

    #[test]
    fn equity_identity_holds_after_every_step() {
        let config = SimulationConfig {
            min_edge_bps: 0.0,
            adverse_return_bps: 0.0,
            cooldown_bars: 0,
            ..Default::default()
        };
        let mut sim = sim(config);
        let mut mid = 100.0;
        for i in 0..100 {
            mid *= if i % 5 == 0 { 0.997 } else { 1.001 };
            let bar = Bar::new(ts(i), mid, mid * 1.008, mid * 0.992, mid, 1.0);
            let quote = Quote::symmetric(bar.timestamp, mid, mid * 0.004, 100.0);
            sim.step_with_quote(&bar, Some(quote)).unwrap();
            let point = sim.equity_curve().last().unwrap();
            let expected = sim.position().cash + sim.position().inventory_qty * mid;
            assert!((point.equity - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn peak_equity_is_non_decreasing() {
        let mut sim = sim(SimulationConfig::default());
        let mut mid = 100.0;
        for i in 0..50 {
            mid *= if i % 2 == 0 { 1.003 } else { 0.998 };
            let bar = Bar::from_mid(ts(i), mid);
            sim.step_with_quote(&bar, None).unwrap();
        }
        let curve = sim.equity_curve();
        for pair in curve.windows(2) {
            assert!(pair[1].peak_equity >= pair[0].peak_equity);
        }
    }
}
