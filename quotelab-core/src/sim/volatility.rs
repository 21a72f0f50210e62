//! Rolling volatility estimate over mid-price returns.

use std::collections::VecDeque;

/// Volatility reported until the window holds at least two returns.
pub const DEFAULT_VOLATILITY: f64 = 0.01;

/// Floor applied to every estimate; a non-positive input regime clamps here.
pub const VOL_EPSILON: f64 = 1e-6;

/// One observation of the estimator after a bar update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolSample {
    /// Simple return of the mid price vs the previous bar (0.0 on the first).
    pub return_frac: f64,
    /// Rolling sample standard deviation of returns, clamped positive.
    pub volatility: f64,
}

/// Incremental rolling sample-stdev estimator.
///
/// Keeps the most recent `window` returns; the estimate matches a pandas-style
/// `rolling(window).std()` with warmup filled at `DEFAULT_VOLATILITY`.
#[derive(Debug, Clone)]
pub struct RollingVolatility {
    window: usize,
    returns: VecDeque<f64>,
    last_mid: Option<f64>,
}

impl RollingVolatility {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
            returns: VecDeque::with_capacity(window.max(2)),
            last_mid: None,
        }
    }

    /// Feed the next mid price; returns this bar's return and the updated
    /// volatility estimate.
    pub fn update(&mut self, mid: f64) -> VolSample {
        let return_frac = match self.last_mid {
            Some(prev) if prev > 0.0 => (mid - prev) / prev,
            _ => 0.0,
        };
        if self.last_mid.is_some() {
            if self.returns.len() == self.window {
                self.returns.pop_front();
            }
            self.returns.push_back(return_frac);
        }
        self.last_mid = Some(mid);

        VolSample {
            return_frac,
            volatility: self.estimate(),
        }
    }

    fn estimate(&self) -> f64 {
        let n = self.returns.len();
        if n < 2 {
            return DEFAULT_VOLATILITY;
        }
        let mean = self.returns.iter().sum::<f64>() / n as f64;
        let variance = self
            .returns
            .iter()
            .map(|r| (r - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;
        variance.sqrt().max(VOL_EPSILON)
    }
}
