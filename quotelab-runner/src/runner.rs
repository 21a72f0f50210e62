//! Single-run entry point: wire the simulator to the metrics engine and gate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quotelab_core::domain::{BarSeries, EquityCurvePoint, Trade};
use quotelab_core::rng::SeedHierarchy;
use quotelab_core::sim;
use quotelab_core::{ConfigError, DataError, InvariantError, SafetyMode, SimError};

use crate::config::BacktestConfig;
use crate::gate::{self, GateOutcome};
use crate::metrics::RunMetrics;

/// Errors from the runner. A failed gate is not among them — that is a
/// legitimate `pass: false` outcome.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantError),
}

impl From<SimError> for RunError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::Config(e) => Self::Config(e),
            SimError::Data(e) => Self::Data(e),
            SimError::Invariant(e) => Self::Invariant(e),
        }
    }
}

/// Complete result of one backtest run over one series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleRunResult {
    pub metrics: RunMetrics,
    pub gate: GateOutcome,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityCurvePoint>,
    /// Whether the drawdown circuit breaker halted entries during the run.
    pub halted: bool,
    pub mode: SafetyMode,
    pub config_hash: String,
}

/// Run one configuration over one series with a fresh simulator.
///
/// The fill RNG is derived from `(seed, variant, capital, window 0)` so the
/// same configuration always reproduces a bit-identical ledger.
pub fn run_single(
    config: &BacktestConfig,
    series: &BarSeries,
    mode: SafetyMode,
) -> Result<SingleRunResult, RunError> {
    mode.require_paper()?;
    config.validate()?;

    let rng = SeedHierarchy::new(config.simulation.seed).rng_for(
        &config.variant.id(),
        config.simulation.initial_capital,
        0,
    );
    let mut provider = config.variant.build_provider();
    let run = sim::run(series, provider.as_mut(), &config.simulation, rng)?;

    let metrics = RunMetrics::compute(
        &run.equity_curve,
        &run.trades,
        config.simulation.initial_capital,
        config.periods_per_year,
    );
    let gate = gate::evaluate(&metrics, &config.gate);

    Ok(SingleRunResult {
        metrics,
        gate,
        trades: run.trades,
        equity_curve: run.equity_curve,
        halted: run.halted,
        mode,
        config_hash: config.config_hash(),
    })
}
