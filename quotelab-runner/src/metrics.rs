//! Performance metrics — pure functions from a completed run to statistics.
//!
//! Every metric is a pure function: equity curve and/or trade ledger in,
//! scalar out. Definitions are fixed for reproducibility; identical inputs
//! must always produce bit-identical metrics.

use serde::{Deserialize, Serialize};

use quotelab_core::domain::{EquityCurvePoint, Position, Trade};

/// Sortino value reported when a run has upside but no downside returns.
/// A large positive sentinel, deliberately not infinity, so reports stay
/// finite and sortable.
pub const SORTINO_SENTINEL: f64 = 1e4;

/// Aggregate statistics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_pnl: f64,
    pub total_return_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown_pct: f64,
    pub cvar_95_pct: f64,
    pub ulcer_index: f64,
    pub profit_factor: f64,
    pub win_rate: f64,
    pub n_trades: usize,
}

impl RunMetrics {
    /// Compute all metrics from an equity curve and trade ledger.
    ///
    /// An empty curve yields all-zero metrics, never NaN and never a panic.
    pub fn compute(
        equity_curve: &[EquityCurvePoint],
        trades: &[Trade],
        initial_capital: f64,
        periods_per_year: f64,
    ) -> Self {
        if equity_curve.is_empty() {
            return Self::zeroed();
        }

        let final_equity = equity_curve.last().map(|p| p.equity).unwrap_or(0.0);
        let total_pnl = final_equity - initial_capital;
        let total_return_pct = if initial_capital > 0.0 {
            total_pnl / initial_capital
        } else {
            0.0
        };

        let returns = bar_returns(equity_curve);
        let max_dd = max_drawdown_pct(equity_curve);
        let trade_pnls = realized_trade_pnls(trades);

        Self {
            total_pnl,
            total_return_pct,
            sharpe_ratio: sharpe_ratio(&returns, periods_per_year),
            sortino_ratio: sortino_ratio(&returns, periods_per_year),
            calmar_ratio: calmar_ratio(total_return_pct, returns.len(), max_dd, periods_per_year),
            max_drawdown_pct: max_dd,
            cvar_95_pct: cvar_95_pct(&returns),
            ulcer_index: ulcer_index(equity_curve),
            profit_factor: profit_factor(&trade_pnls),
            win_rate: win_rate(&trade_pnls),
            n_trades: trades.len(),
        }
    }

    /// The all-zero metrics of an empty or failed run.
    pub fn zeroed() -> Self {
        Self {
            total_pnl: 0.0,
            total_return_pct: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            calmar_ratio: 0.0,
            max_drawdown_pct: 0.0,
            cvar_95_pct: 0.0,
            ulcer_index: 0.0,
            profit_factor: 0.0,
            win_rate: 0.0,
            n_trades: 0,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Per-bar simple returns of the equity curve.
pub fn bar_returns(equity_curve: &[EquityCurvePoint]) -> Vec<f64> {
    if equity_curve.len() < 2 {
        return Vec::new();
    }
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0].equity > 0.0 {
                (w[1].equity - w[0].equity) / w[0].equity
            } else {
                0.0
            }
        })
        .collect()
}

/// Annualized Sharpe ratio: mean / sample stdev * sqrt(periods_per_year).
///
/// An all-zero (or any zero-variance) return series yields 0.0, never NaN.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    let std = sample_std_dev(returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * periods_per_year.sqrt()
}

/// Annualized Sortino ratio using downside deviation.
///
/// The downside deviation is the root mean square of negative returns,
/// normalized by the full sample size. A run with upside and no downside
/// returns the `SORTINO_SENTINEL` rather than infinity; a vanishing downside
/// deviation clamps to the same sentinel so the ratio stays bounded.
pub fn sortino_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    let downside_sq: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();

    if downside_sq == 0.0 {
        return if mean > 0.0 { SORTINO_SENTINEL } else { 0.0 };
    }
    let downside_std = (downside_sq / returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    ((mean / downside_std) * periods_per_year.sqrt())
        .clamp(-SORTINO_SENTINEL, SORTINO_SENTINEL)
}

/// Maximum fractional decline from the running equity peak.
pub fn max_drawdown_pct(equity_curve: &[EquityCurvePoint]) -> f64 {
    equity_curve
        .iter()
        .map(|p| p.drawdown_from_peak)
        .fold(0.0, f64::max)
}

/// Calmar ratio: annualized return over max drawdown, with an epsilon floor
/// on the denominator.
pub fn calmar_ratio(
    total_return_pct: f64,
    n_returns: usize,
    max_drawdown_pct: f64,
    periods_per_year: f64,
) -> f64 {
    if n_returns == 0 {
        return 0.0;
    }
    let annualized = total_return_pct * periods_per_year / n_returns as f64;
    annualized / max_drawdown_pct.max(1e-9)
}

/// CVaR95: mean magnitude of the worst 5% of per-bar returns (expected
/// shortfall). Reported as a positive number; 0.0 when the tail is not a
/// loss.
pub fn cvar_95_pct(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let cutoff = ((sorted.len() as f64 * 0.05).ceil() as usize).max(1);
    let tail_mean = mean_f64(&sorted[..cutoff]);
    (-tail_mean).max(0.0)
}

/// Ulcer index: root mean square of the drawdown series.
pub fn ulcer_index(equity_curve: &[EquityCurvePoint]) -> f64 {
    if equity_curve.is_empty() {
        return 0.0;
    }
    let mean_sq = equity_curve
        .iter()
        .map(|p| p.drawdown_from_peak.powi(2))
        .sum::<f64>()
        / equity_curve.len() as f64;
    mean_sq.sqrt()
}

/// Profit factor over realizing trades: gross wins / |gross losses|.
///
/// Sentinel +infinity when there are winners and no losers; 0.0 with no
/// realizing trades.
pub fn profit_factor(trade_pnls: &[f64]) -> f64 {
    if trade_pnls.is_empty() {
        return 0.0;
    }
    let wins: f64 = trade_pnls.iter().filter(|&&p| p > 0.0).sum();
    let losses: f64 = trade_pnls.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();
    if losses < 1e-12 {
        return if wins > 0.0 { f64::INFINITY } else { 0.0 };
    }
    wins / losses
}

/// Fraction of realizing trades that made money. 0.0 with no trades.
pub fn win_rate(trade_pnls: &[f64]) -> f64 {
    if trade_pnls.is_empty() {
        return 0.0;
    }
    let winners = trade_pnls.iter().filter(|&&p| p > 0.0).count();
    winners as f64 / trade_pnls.len() as f64
}

/// Net realized PnL per realizing trade, by replaying the ledger through the
/// position accounting. Pure opening trades carry no realized PnL and are
/// excluded; realizing trades are charged their own fee.
pub fn realized_trade_pnls(trades: &[Trade]) -> Vec<f64> {
    let mut book = Position::new(0.0);
    let mut out = Vec::new();
    for trade in trades {
        let inventory_before = book.inventory_qty;
        let realized_before = book.realized_pnl;
        book.apply(trade.side, trade.price, trade.quantity, trade.fee);
        let realizes = inventory_before * trade.signed_quantity() < 0.0;
        if realizes {
            out.push(book.realized_pnl - realized_before - trade.fee);
        }
    }
    out
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
