//! QuoteLab Runner — statistical gating on top of the execution simulator.
//!
//! This crate builds on `quotelab-core` to provide:
//! - The metrics engine (Sharpe/Sortino/Calmar/CVaR/Ulcer and friends)
//! - Gate evaluation with itemized fail reasons
//! - Window splitting and walk-forward validation
//! - Parameter-sweep robustness ranking with a recommendation
//! - Campaign aggregation (min/mean/max stability summaries)
//! - Stable report schemas for downstream tooling

pub mod campaign;
pub mod config;
pub mod gate;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sweep;
pub mod walk_forward;
pub mod windows;

pub use campaign::{run_campaign, CampaignReport, MetricSummary};
pub use config::{BacktestConfig, ConfigFileError, WindowConfig};
pub use gate::{evaluate, FailReason, GateOutcome, GateThresholds};
pub use metrics::{RunMetrics, SORTINO_SENTINEL};
pub use report::{candidates_to_csv, windows_to_csv, MetricsArtifact};
pub use runner::{run_single, RunError, SingleRunResult};
pub use sweep::{
    run_sweep, ExperimentCandidate, ExperimentGrid, RobustnessWeights, SweepReport,
};
pub use walk_forward::{run_walk_forward, WalkForwardReport, WindowResult};
pub use windows::{split, WindowSpec};
