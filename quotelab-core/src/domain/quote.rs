//! Quote — a two-sided price proposal from a quoting model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A two-sided quote issued for one bar.
///
/// A provider that declines to quote returns `None` instead; the simulator
/// treats that step as a no-op (equity is still marked).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid_price: f64,
    pub ask_price: f64,
    pub bid_size: f64,
    pub ask_size: f64,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Symmetric quote around a mid price with the given half-spread.
    pub fn symmetric(timestamp: DateTime<Utc>, mid: f64, half_spread: f64, size: f64) -> Self {
        Self {
            bid_price: mid - half_spread,
            ask_price: mid + half_spread,
            bid_size: size,
            ask_size: size,
            timestamp,
        }
    }

    /// Gross quoted spread as a fraction of the given mid price.
    pub fn spread_frac(&self, mid: f64) -> f64 {
        if mid <= 0.0 {
            return 0.0;
        }
        ((self.ask_price - self.bid_price) / mid).max(0.0)
    }

    /// Both prices positive and bid below ask.
    pub fn is_sane(&self) -> bool {
        self.bid_price > 0.0
            && self.ask_price > self.bid_price
            && self.bid_size >= 0.0
            && self.ask_size >= 0.0
    }
}
