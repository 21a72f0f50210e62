//! Equity curve points with running-peak drawdown tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One mark-to-market observation of the account.
///
/// `peak_equity` is non-decreasing across a run; `drawdown_from_peak` is the
/// positive fractional decline from that peak (0.0 at a new high).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurvePoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
    pub peak_equity: f64,
    pub drawdown_from_peak: f64,
}

impl EquityCurvePoint {
    /// Extend a curve: compute the running peak from the previous point.
    pub fn next(prev_peak: f64, timestamp: DateTime<Utc>, equity: f64) -> Self {
        let peak_equity = prev_peak.max(equity);
        let drawdown_from_peak = if peak_equity > 0.0 {
            ((peak_equity - equity) / peak_equity).max(0.0)
        } else {
            0.0
        };
        Self {
            timestamp,
            equity,
            peak_equity,
            drawdown_from_peak,
        }
    }
}
