//! Per-step risk overlays.
//!
//! Computed once at the top of every step from the marked-to-market account
//! state: the volatility-targeted spread widening, the risk-off regime, the
//! hard drawdown stop, the effective soft inventory cap, and the adverse-move
//! fill blocks.

use crate::config::SimulationConfig;

/// Multiplier applied to the spread constraint while risk-off.
pub const RISK_OFF_SPREAD_WIDEN: f64 = 1.25;

/// Extra minimum edge (bps) demanded while risk-off.
pub const RISK_OFF_EDGE_BUMP_BPS: f64 = 0.5;

/// Bounds on the volatility ratio fed into spread widening.
pub const VOL_RATIO_MIN: f64 = 0.5;
pub const VOL_RATIO_MAX: f64 = 5.0;

/// Effective per-step constraints derived from the risk state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOverlays {
    /// Fractional drawdown from the running equity peak.
    pub drawdown: f64,
    /// Soft drawdown breach: widen-only quoting and a scaled-down soft cap.
    pub risk_off: bool,
    /// Hard drawdown breach: liquidate and halt new entries.
    pub hard_stop: bool,
    /// Effective minimum spread in price units (volatility-widened; only
    /// ever wider than the configured base).
    pub effective_spread_constraint: f64,
    /// Effective minimum net edge in basis points.
    pub effective_min_edge_bps: f64,
    /// Effective soft inventory cap in quantity units.
    pub effective_soft_cap: f64,
    /// Suppress bid fills this step (price moved sharply down into our bid).
    pub adverse_buy_block: bool,
    /// Suppress ask fills this step while not long.
    pub adverse_sell_block: bool,
}

/// Derive the step overlays.
///
/// `soft_cap_units` is the unscaled soft cap in quantity units;
/// `bar_return` is the current bar's mid return.
pub fn compute(
    config: &SimulationConfig,
    mid: f64,
    volatility: f64,
    bar_return: f64,
    equity: f64,
    peak_equity: f64,
    soft_cap_units: f64,
) -> StepOverlays {
    let drawdown = ((peak_equity - equity) / peak_equity.max(1e-9)).max(0.0);
    let risk_off = drawdown >= config.drawdown_soft;
    let hard_stop = drawdown >= config.drawdown_hard;

    let mut eff_bps = config.spread_constraint_bps;
    if config.target_volatility > 0.0 && volatility > 0.0 {
        let vol_ratio =
            (volatility / config.target_volatility).clamp(VOL_RATIO_MIN, VOL_RATIO_MAX);
        eff_bps *= 1.0 + config.vol_spread_scale * (vol_ratio - 1.0).max(0.0);
    }
    if risk_off {
        eff_bps *= RISK_OFF_SPREAD_WIDEN;
    }
    let effective_spread_constraint = mid * (eff_bps / 10_000.0);

    let mut effective_min_edge_bps = config.min_edge_bps;
    if risk_off {
        effective_min_edge_bps += RISK_OFF_EDGE_BUMP_BPS;
    }

    let scale = if risk_off {
        config.risk_off_inventory_scale
    } else {
        1.0
    };
    let effective_soft_cap = (soft_cap_units * scale).max(1e-9);

    let threshold = config.adverse_return_bps / 10_000.0;
    let adverse_active = config.adverse_return_bps > 0.0;
    let adverse_buy_block = adverse_active && bar_return <= -threshold;
    let adverse_sell_block = adverse_active && bar_return >= threshold;

    StepOverlays {
        drawdown,
        risk_off,
        hard_stop,
        effective_spread_constraint,
        effective_min_edge_bps,
        effective_soft_cap,
        adverse_buy_block,
        adverse_sell_block,
    }
}
