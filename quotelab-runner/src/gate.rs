//! Gate evaluation — pass/fail verdicts with itemized reasons.
//!
//! Every check evaluates independently (no short-circuit) so a report always
//! lists the complete set of violations, not just the first.

use serde::{Deserialize, Serialize};

use quotelab_core::ConfigError;

use crate::metrics::RunMetrics;

/// Thresholds a run must satisfy to pass the gate.
///
/// Optional checks (`None`) are disabled. `max_total_return_pct` is the
/// plausibility cap: a return above it is treated as evidence of look-ahead
/// or an accounting artifact, not of skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateThresholds {
    pub max_drawdown_pct: f64,
    pub min_sharpe: Option<f64>,
    pub min_sortino: Option<f64>,
    pub max_cvar95_pct: Option<f64>,
    pub max_total_return_pct: f64,
    pub min_pass_rate: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            max_drawdown_pct: 0.40,
            min_sharpe: Some(0.0),
            min_sortino: None,
            max_cvar95_pct: None,
            max_total_return_pct: 3.0,
            min_pass_rate: 0.60,
        }
    }
}

impl GateThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn unit_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: 1.0,
                })
            }
        }
        unit_range("max_drawdown_pct", self.max_drawdown_pct)?;
        unit_range("min_pass_rate", self.min_pass_rate)?;
        if self.max_total_return_pct <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "max_total_return_pct",
                value: self.max_total_return_pct,
            });
        }
        Ok(())
    }
}

/// One violated check, carrying the observed value and the limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailReason {
    DrawdownBreach { observed: f64, limit: f64 },
    SharpeBelowMin { observed: f64, limit: f64 },
    SortinoBelowMin { observed: f64, limit: f64 },
    CvarBreach { observed: f64, limit: f64 },
    ImplausibleReturn { observed: f64, limit: f64 },
    /// The window's run errored before metrics existed (recorded, counted as
    /// a fail; never aborts the wider evaluation).
    WindowError { message: String },
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DrawdownBreach { observed, limit } => {
                write!(f, "drawdown_breach: {observed:.4} > {limit:.4}")
            }
            Self::SharpeBelowMin { observed, limit } => {
                write!(f, "sharpe_below_min: {observed:.4} < {limit:.4}")
            }
            Self::SortinoBelowMin { observed, limit } => {
                write!(f, "sortino_below_min: {observed:.4} < {limit:.4}")
            }
            Self::CvarBreach { observed, limit } => {
                write!(f, "cvar_breach: {observed:.4} > {limit:.4}")
            }
            Self::ImplausibleReturn { observed, limit } => {
                write!(f, "implausible_return: {observed:.4} > {limit:.4}")
            }
            Self::WindowError { message } => write!(f, "window_error: {message}"),
        }
    }
}

/// The gate verdict: pass iff no reason fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub pass: bool,
    pub fail_reasons: Vec<FailReason>,
}

impl GateOutcome {
    pub fn from_reasons(fail_reasons: Vec<FailReason>) -> Self {
        Self {
            pass: fail_reasons.is_empty(),
            fail_reasons,
        }
    }
}

/// Evaluate all enabled checks against one run's metrics.
pub fn evaluate(metrics: &RunMetrics, thresholds: &GateThresholds) -> GateOutcome {
    let mut reasons = Vec::new();

    if metrics.max_drawdown_pct > thresholds.max_drawdown_pct {
        reasons.push(FailReason::DrawdownBreach {
            observed: metrics.max_drawdown_pct,
            limit: thresholds.max_drawdown_pct,
        });
    }
    if let Some(min_sharpe) = thresholds.min_sharpe {
        if metrics.sharpe_ratio < min_sharpe {
            reasons.push(FailReason::SharpeBelowMin {
                observed: metrics.sharpe_ratio,
                limit: min_sharpe,
            });
        }
    }
    if let Some(min_sortino) = thresholds.min_sortino {
        if metrics.sortino_ratio < min_sortino {
            reasons.push(FailReason::SortinoBelowMin {
                observed: metrics.sortino_ratio,
                limit: min_sortino,
            });
        }
    }
    if let Some(max_cvar) = thresholds.max_cvar95_pct {
        if metrics.cvar_95_pct > max_cvar {
            reasons.push(FailReason::CvarBreach {
                observed: metrics.cvar_95_pct,
                limit: max_cvar,
            });
        }
    }
    if metrics.total_return_pct > thresholds.max_total_return_pct {
        reasons.push(FailReason::ImplausibleReturn {
            observed: metrics.total_return_pct,
            limit: thresholds.max_total_return_pct,
        });
    }

    GateOutcome::from_reasons(reasons)
}
