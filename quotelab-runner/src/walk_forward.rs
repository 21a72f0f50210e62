//! Walk-forward validation — independent evaluation of chronological windows.
//!
//! Each window runs a fresh simulator; windows are embarrassingly parallel
//! and execute across the rayon pool with per-window derived RNG streams, so
//! worker scheduling never changes results. A window that errors is recorded
//! as a failed window (it stays in the `pass_rate` denominator) and never
//! aborts the wider evaluation.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use quotelab_core::domain::BarSeries;
use quotelab_core::rng::SeedHierarchy;
use quotelab_core::{sim, SafetyMode};

use crate::config::BacktestConfig;
use crate::gate::{self, FailReason};
use crate::metrics::RunMetrics;
use crate::runner::RunError;
use crate::windows::{self, WindowSpec};

/// Immutable outcome of one evaluation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    pub window_id: usize,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub bars: usize,
    pub metrics: RunMetrics,
    pub pass: bool,
    pub fail_reasons: Vec<FailReason>,
}

/// The walk-forward gate verdict across all windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardReport {
    pub windows: Vec<WindowResult>,
    /// Passing windows over all windows — failed/errored windows count in
    /// the denominator.
    pub pass_rate: f64,
    /// Windows whose drawdown breached the hard limit.
    pub hard_fail_windows: usize,
    pub strict: bool,
    pub overall_pass: bool,
}

/// Run the walk-forward gate: split, evaluate every window independently,
/// aggregate.
pub fn run_walk_forward(
    config: &BacktestConfig,
    series: &BarSeries,
    strict: bool,
    mode: SafetyMode,
) -> Result<WalkForwardReport, RunError> {
    mode.require_paper()?;
    config.validate()?;

    let specs = windows::split(
        series,
        config.window.window_days,
        config.window.max_windows,
        config.window.min_bars,
    )?;

    let results: Vec<WindowResult> = specs
        .par_iter()
        .map(|spec| evaluate_window(config, series, spec))
        .collect();

    Ok(aggregate(results, strict, config))
}

/// Evaluate one window with a fresh simulator and its own RNG stream.
fn evaluate_window(
    config: &BacktestConfig,
    series: &BarSeries,
    spec: &WindowSpec,
) -> WindowResult {
    let window_series = series.slice(spec.start_index, spec.end_index);
    let rng = SeedHierarchy::new(config.simulation.seed).rng_for(
        &config.variant.id(),
        config.simulation.initial_capital,
        spec.window_id as u64,
    );
    let mut provider = config.variant.build_provider();

    match sim::run(&window_series, provider.as_mut(), &config.simulation, rng) {
        Ok(run) => {
            let metrics = RunMetrics::compute(
                &run.equity_curve,
                &run.trades,
                config.simulation.initial_capital,
                config.periods_per_year,
            );
            let outcome = gate::evaluate(&metrics, &config.gate);
            WindowResult {
                window_id: spec.window_id,
                start_utc: spec.start_utc,
                end_utc: spec.end_utc,
                bars: spec.n_bars(),
                metrics,
                pass: outcome.pass,
                fail_reasons: outcome.fail_reasons,
            }
        }
        Err(err) => WindowResult {
            window_id: spec.window_id,
            start_utc: spec.start_utc,
            end_utc: spec.end_utc,
            bars: spec.n_bars(),
            metrics: RunMetrics::zeroed(),
            pass: false,
            fail_reasons: vec![FailReason::WindowError {
                message: err.to_string(),
            }],
        },
    }
}

fn aggregate(windows: Vec<WindowResult>, strict: bool, config: &BacktestConfig) -> WalkForwardReport {
    let total = windows.len();
    let passing = windows.iter().filter(|w| w.pass).count();
    let pass_rate = if total > 0 {
        passing as f64 / total as f64
    } else {
        0.0
    };
    let hard_fail_windows = windows
        .iter()
        .filter(|w| w.metrics.max_drawdown_pct > config.gate.max_drawdown_pct)
        .count();
    let overall_pass = pass_rate >= config.gate.min_pass_rate && hard_fail_windows == 0;

    WalkForwardReport {
        windows,
        pass_rate,
        hard_fail_windows,
        strict,
        overall_pass,
    }
}
