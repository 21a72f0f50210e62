//! Report artifacts — stable output schemas for downstream tooling.
//!
//! The JSON key sets here are contracts: downstream consumers match on them
//! bit-exactly. `MetricsArtifact` flattens `RunMetrics` into the canonical
//! per-run key set; the CSV exporters mirror the window and candidate tables.

use serde::{Deserialize, Serialize};

use crate::metrics::RunMetrics;
use crate::sweep::ExperimentCandidate;
use crate::walk_forward::WindowResult;

/// Canonical per-run metrics object.
///
/// Keys (exact): `total_pnl, sharpe_ratio, sortino_ratio, calmar_ratio,
/// max_drawdown, cvar_95_pct, ulcer_index, profit_factor, win_rate,
/// n_trades`. `max_drawdown` carries the fractional drawdown value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsArtifact {
    pub total_pnl: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown: f64,
    pub cvar_95_pct: f64,
    pub ulcer_index: f64,
    pub profit_factor: f64,
    pub win_rate: f64,
    pub n_trades: usize,
}

impl From<&RunMetrics> for MetricsArtifact {
    fn from(m: &RunMetrics) -> Self {
        Self {
            total_pnl: m.total_pnl,
            sharpe_ratio: m.sharpe_ratio,
            sortino_ratio: m.sortino_ratio,
            calmar_ratio: m.calmar_ratio,
            max_drawdown: m.max_drawdown_pct,
            cvar_95_pct: m.cvar_95_pct,
            ulcer_index: m.ulcer_index,
            profit_factor: m.profit_factor,
            win_rate: m.win_rate,
            n_trades: m.n_trades,
        }
    }
}

/// Render walk-forward window results as a CSV table.
pub fn windows_to_csv(windows: &[WindowResult]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "window_id",
        "start_utc",
        "end_utc",
        "bars",
        "total_pnl",
        "sharpe_ratio",
        "max_drawdown",
        "n_trades",
        "pass",
        "fail_reasons",
    ])?;
    for w in windows {
        let reasons = w
            .fail_reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        writer.write_record([
            w.window_id.to_string(),
            w.start_utc.to_rfc3339(),
            w.end_utc.to_rfc3339(),
            w.bars.to_string(),
            w.metrics.total_pnl.to_string(),
            w.metrics.sharpe_ratio.to_string(),
            w.metrics.max_drawdown_pct.to_string(),
            w.metrics.n_trades.to_string(),
            w.pass.to_string(),
            reasons,
        ])?;
    }
    let bytes = writer.into_inner().expect("csv writer over Vec cannot fail");
    Ok(String::from_utf8(bytes).expect("csv output is utf-8"))
}

/// Render ranked sweep candidates as a CSV table.
pub fn candidates_to_csv(candidates: &[ExperimentCandidate]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "variant_id",
        "budget",
        "seed",
        "robustness_score",
        "pass_rate",
        "hard_fail_windows",
        "total_pnl",
        "sharpe_ratio",
        "sortino_ratio",
        "max_drawdown",
        "cvar_95_pct",
        "plausibility_flag",
    ])?;
    for c in candidates {
        writer.write_record([
            c.variant_id.clone(),
            c.budget.to_string(),
            c.seed.to_string(),
            c.robustness_score.to_string(),
            c.pass_rate.to_string(),
            c.hard_fail_windows.to_string(),
            c.metrics.total_pnl.to_string(),
            c.metrics.sharpe_ratio.to_string(),
            c.metrics.sortino_ratio.to_string(),
            c.metrics.max_drawdown_pct.to_string(),
            c.metrics.cvar_95_pct.to_string(),
            c.plausibility_flag.to_string(),
        ])?;
    }
    let bytes = writer.into_inner().expect("csv writer over Vec cannot fail");
    Ok(String::from_utf8(bytes).expect("csv output is utf-8"))
}
