//! Campaign aggregation — distributional stability of one configuration.
//!
//! Repeats a single configuration N times with independent derived RNG
//! streams and reports min/mean/max per headline metric. A smoke check on
//! stability, never an input to ranking or selection.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use quotelab_core::domain::BarSeries;
use quotelab_core::rng::SeedHierarchy;
use quotelab_core::{sim, SafetyMode};

use crate::config::BacktestConfig;
use crate::metrics::RunMetrics;
use crate::runner::RunError;

/// Distribution summary of one metric across the campaign's runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl MetricSummary {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                min: 0.0,
                mean: 0.0,
                max: 0.0,
            };
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Self { min, mean, max }
    }
}

/// The campaign artifact: run count, per-metric summaries, and the files the
/// caller wrote them to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub runs: usize,
    pub summary: BTreeMap<String, MetricSummary>,
    pub files: Vec<String>,
}

/// Run one configuration `n` times with repeat-indexed RNG streams.
pub fn run_campaign(
    config: &BacktestConfig,
    series: &BarSeries,
    n: usize,
    mode: SafetyMode,
) -> Result<CampaignReport, RunError> {
    mode.require_paper()?;
    config.validate()?;

    let hierarchy = SeedHierarchy::new(config.simulation.seed);
    let variant_id = config.variant.id();

    let all_metrics: Vec<RunMetrics> = (0..n)
        .into_par_iter()
        .map(|repeat| {
            let rng = hierarchy.rng_for(
                &variant_id,
                config.simulation.initial_capital,
                repeat as u64,
            );
            let mut provider = config.variant.build_provider();
            sim::run(series, provider.as_mut(), &config.simulation, rng).map(|run| {
                RunMetrics::compute(
                    &run.equity_curve,
                    &run.trades,
                    config.simulation.initial_capital,
                    config.periods_per_year,
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CampaignReport {
        runs: all_metrics.len(),
        summary: summarize(&all_metrics),
        files: Vec::new(),
    })
}

/// Build the per-metric min/mean/max table, keyed by artifact metric names.
fn summarize(all: &[RunMetrics]) -> BTreeMap<String, MetricSummary> {
    let columns: [(&str, fn(&RunMetrics) -> f64); 10] = [
        ("total_pnl", |m| m.total_pnl),
        ("sharpe_ratio", |m| m.sharpe_ratio),
        ("sortino_ratio", |m| m.sortino_ratio),
        ("calmar_ratio", |m| m.calmar_ratio),
        ("max_drawdown", |m| m.max_drawdown_pct),
        ("cvar_95_pct", |m| m.cvar_95_pct),
        ("ulcer_index", |m| m.ulcer_index),
        ("profit_factor", |m| m.profit_factor),
        ("win_rate", |m| m.win_rate),
        ("n_trades", |m| m.n_trades as f64),
    ];

    columns
        .iter()
        .map(|(name, extract)| {
            let values: Vec<f64> = all
                .iter()
                .map(extract)
                .filter(|v| v.is_finite())
                .collect();
            (name.to_string(), MetricSummary::from_values(&values))
        })
        .collect()
}
