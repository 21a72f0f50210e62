//! Fixed-spread provider — symmetric quotes at a constant fractional spread.

use crate::domain::Quote;

use super::{MarketState, QuoteProvider};

/// Quotes `mid ± max(half_spread_frac * mid, constraint/2)` every bar.
///
/// The simplest possible provider; used by tests and as a demo baseline.
#[derive(Debug, Clone)]
pub struct FixedSpreadQuoter {
    pub half_spread_frac: f64,
    pub size: f64,
}

impl FixedSpreadQuoter {
    pub fn new(half_spread_frac: f64) -> Self {
        Self {
            half_spread_frac,
            size: 1.0,
        }
    }
}

impl QuoteProvider for FixedSpreadQuoter {
    fn quote(&mut self, state: &MarketState) -> Option<Quote> {
        let half = (self.half_spread_frac * state.mid_price).max(state.spread_constraint / 2.0);
        Some(Quote::symmetric(
            state.timestamp,
            state.mid_price,
            half,
            self.size,
        ))
    }

    fn name(&self) -> &'static str {
        "fixed_spread"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn state(mid: f64, constraint: f64) -> MarketState {
        MarketState {
            timestamp: chrono::Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
            bar_index: 0,
            mid_price: mid,
            volatility: 0.01,
            inventory_qty: 0.0,
            spread_constraint: constraint,
        }
    }

    #[test]
    fn quotes_symmetrically_around_mid() {
        let mut quoter = FixedSpreadQuoter::new(0.001);
        let q = quoter.quote(&state(100.0, 0.0)).unwrap();
        assert!((q.bid_price - 99.9).abs() < 1e-10);
        assert!((q.ask_price - 100.1).abs() < 1e-10);
    }

    #[test]
    fn constraint_floors_the_spread() {
        let mut quoter = FixedSpreadQuoter::new(0.0001);
        let q = quoter.quote(&state(100.0, 1.0)).unwrap();
        assert!((q.ask_price - q.bid_price - 1.0).abs() < 1e-10);
    }
}
