//! Experiment sweep — robustness ranking over a parameter grid.
//!
//! Enumerates the cartesian product of (budget, variant, seed), evaluates
//! every window independently per tuple, aggregates per-window metrics into
//! one candidate, and ranks candidates by a named robustness composite. The
//! sweep never aborts on a bad tuple: errors become zero-metric candidates
//! and the report is always emitted.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use quotelab_core::domain::BarSeries;
use quotelab_core::quoting::VariantSpec;
use quotelab_core::rng::SeedHierarchy;
use quotelab_core::{sim, SafetyMode};

use crate::config::BacktestConfig;
use crate::gate;
use crate::metrics::RunMetrics;
use crate::runner::RunError;
use crate::windows::{self, WindowSpec};

/// The grid to sweep: every (budget, variant, seed) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentGrid {
    pub budgets: Vec<f64>,
    pub variants: Vec<VariantSpec>,
    pub seeds: Vec<u64>,
}

impl ExperimentGrid {
    pub fn size(&self) -> usize {
        self.budgets.len() * self.variants.len() * self.seeds.len()
    }

    fn tuples(&self) -> Vec<(f64, VariantSpec, u64)> {
        let mut out = Vec::with_capacity(self.size());
        for &budget in &self.budgets {
            for variant in &self.variants {
                for &seed in &self.seeds {
                    out.push((budget, variant.clone(), seed));
                }
            }
        }
        out
    }
}

/// Weights of the robustness composite. Named configuration, never inferred:
///
/// ```text
/// score = w_sortino * sortino + w_calmar * calmar + w_pass_rate * pass_rate
///       - w_cvar * cvar_95 - w_drawdown * max_drawdown
///       - anomaly_penalty * [return above plausibility cap]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobustnessWeights {
    pub w_sortino: f64,
    pub w_calmar: f64,
    pub w_pass_rate: f64,
    pub w_cvar: f64,
    pub w_drawdown: f64,
    pub anomaly_penalty: f64,
}

impl Default for RobustnessWeights {
    fn default() -> Self {
        Self {
            w_sortino: 1.0,
            w_calmar: 0.5,
            w_pass_rate: 2.0,
            w_cvar: 10.0,
            w_drawdown: 3.0,
            anomaly_penalty: 5.0,
        }
    }
}

impl RobustnessWeights {
    /// Score one candidate. Sortino arrives already clamped at its sentinel,
    /// so a no-downside window cannot dominate the ranking.
    pub fn score(
        &self,
        metrics: &RunMetrics,
        pass_rate: f64,
        plausibility_flag: bool,
    ) -> f64 {
        let penalty = if plausibility_flag {
            self.anomaly_penalty
        } else {
            0.0
        };
        self.w_sortino * metrics.sortino_ratio
            + self.w_calmar * metrics.calmar_ratio
            + self.w_pass_rate * pass_rate
            - self.w_cvar * metrics.cvar_95_pct
            - self.w_drawdown * metrics.max_drawdown_pct
            - penalty
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentCandidate {
    pub variant_id: String,
    pub budget: f64,
    pub seed: u64,
    /// Mean of each metric across windows.
    pub metrics: RunMetrics,
    pub pass_rate: f64,
    pub hard_fail_windows: usize,
    pub robustness_score: f64,
    /// Mean return exceeded the plausibility cap.
    pub plausibility_flag: bool,
}

/// The sweep output: every candidate ranked, plus the recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub grid: ExperimentGrid,
    pub candidates: Vec<ExperimentCandidate>,
    pub recommended: Option<ExperimentCandidate>,
    /// Why `recommended` is null, when it is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<String>,
}

/// Run the sweep. Grid points execute across the rayon pool; each
/// `(seed, variant, budget, window)` tuple owns a BLAKE3-derived RNG stream,
/// so scheduling order never changes results.
///
/// Only up-front problems (mode, invalid base config, a series too short for
/// one window) error; per-tuple failures are absorbed into zero-metric
/// candidates.
pub fn run_sweep(
    grid: &ExperimentGrid,
    base_config: &BacktestConfig,
    series: &BarSeries,
    weights: &RobustnessWeights,
    mode: SafetyMode,
) -> Result<SweepReport, RunError> {
    mode.require_paper()?;
    base_config.validate()?;

    let specs = windows::split(
        series,
        base_config.window.window_days,
        base_config.window.max_windows,
        base_config.window.min_bars,
    )?;

    let mut candidates: Vec<ExperimentCandidate> = grid
        .tuples()
        .par_iter()
        .map(|(budget, variant, seed)| {
            evaluate_tuple(base_config, series, &specs, *budget, variant, *seed, weights)
        })
        .collect();

    sort_candidates(&mut candidates);

    let (recommended, recommendation_reason) = recommend(&candidates, base_config);

    Ok(SweepReport {
        grid: grid.clone(),
        candidates,
        recommended,
        recommendation_reason,
    })
}

/// Evaluate one grid tuple across every window and aggregate.
fn evaluate_tuple(
    base_config: &BacktestConfig,
    series: &BarSeries,
    specs: &[WindowSpec],
    budget: f64,
    variant: &VariantSpec,
    seed: u64,
    weights: &RobustnessWeights,
) -> ExperimentCandidate {
    let mut sim_config = base_config.simulation.clone();
    sim_config.initial_capital = budget;
    sim_config.seed = seed;
    let hierarchy = SeedHierarchy::new(seed);
    let variant_id = variant.id();

    let mut window_metrics: Vec<RunMetrics> = Vec::with_capacity(specs.len());
    let mut passing = 0usize;
    let mut hard_fails = 0usize;

    for spec in specs {
        let window_series = series.slice(spec.start_index, spec.end_index);
        let rng = hierarchy.rng_for(&variant_id, budget, spec.window_id as u64);
        let mut provider = variant.build_provider();

        match sim::run(&window_series, provider.as_mut(), &sim_config, rng) {
            Ok(run) => {
                let metrics = RunMetrics::compute(
                    &run.equity_curve,
                    &run.trades,
                    budget,
                    base_config.periods_per_year,
                );
                if metrics.max_drawdown_pct > base_config.gate.max_drawdown_pct {
                    hard_fails += 1;
                }
                if gate::evaluate(&metrics, &base_config.gate).pass {
                    passing += 1;
                }
                window_metrics.push(metrics);
            }
            Err(_) => {
                // A failed window counts as a fail in the denominator, with
                // zeroed metrics folded into the aggregate.
                window_metrics.push(RunMetrics::zeroed());
            }
        }
    }

    let pass_rate = if specs.is_empty() {
        0.0
    } else {
        passing as f64 / specs.len() as f64
    };
    let metrics = mean_metrics(&window_metrics);
    let plausibility_flag = metrics.total_return_pct > base_config.gate.max_total_return_pct;
    let robustness_score = weights.score(&metrics, pass_rate, plausibility_flag);

    ExperimentCandidate {
        variant_id,
        budget,
        seed,
        metrics,
        pass_rate,
        hard_fail_windows: hard_fails,
        robustness_score,
        plausibility_flag,
    }
}

/// Mean of each metric field across windows. Infinite profit factors are
/// folded in as zero-loss windows dominate otherwise.
fn mean_metrics(windows: &[RunMetrics]) -> RunMetrics {
    if windows.is_empty() {
        return RunMetrics::zeroed();
    }
    let n = windows.len() as f64;
    let mean = |f: fn(&RunMetrics) -> f64| windows.iter().map(f).sum::<f64>() / n;
    let finite_pf: Vec<f64> = windows
        .iter()
        .map(|m| m.profit_factor)
        .filter(|pf| pf.is_finite())
        .collect();
    RunMetrics {
        total_pnl: mean(|m| m.total_pnl),
        total_return_pct: mean(|m| m.total_return_pct),
        sharpe_ratio: mean(|m| m.sharpe_ratio),
        sortino_ratio: mean(|m| m.sortino_ratio),
        calmar_ratio: mean(|m| m.calmar_ratio),
        max_drawdown_pct: mean(|m| m.max_drawdown_pct),
        cvar_95_pct: mean(|m| m.cvar_95_pct),
        ulcer_index: mean(|m| m.ulcer_index),
        profit_factor: if finite_pf.is_empty() {
            f64::INFINITY
        } else {
            finite_pf.iter().sum::<f64>() / finite_pf.len() as f64
        },
        win_rate: mean(|m| m.win_rate),
        n_trades: (windows.iter().map(|m| m.n_trades).sum::<usize>() as f64 / n).round() as usize,
    }
}

/// Sort by robustness score descending, ties by pass rate then lower
/// drawdown.
fn sort_candidates(candidates: &mut [ExperimentCandidate]) {
    candidates.sort_by(|a, b| {
        b.robustness_score
            .partial_cmp(&a.robustness_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.pass_rate
                    .partial_cmp(&a.pass_rate)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(
                a.metrics
                    .max_drawdown_pct
                    .partial_cmp(&b.metrics.max_drawdown_pct)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
}

/// The top candidate meeting the qualification bar, or an explicit reason.
fn recommend(
    candidates: &[ExperimentCandidate],
    config: &BacktestConfig,
) -> (Option<ExperimentCandidate>, Option<String>) {
    let qualified = candidates
        .iter()
        .find(|c| c.pass_rate >= config.gate.min_pass_rate && c.hard_fail_windows == 0);
    match qualified {
        Some(candidate) => (Some(candidate.clone()), None),
        None => (
            None,
            Some(format!(
                "no candidate reached pass_rate >= {:.2} with zero hard-fail windows",
                config.gate.min_pass_rate
            )),
        ),
    }
}
