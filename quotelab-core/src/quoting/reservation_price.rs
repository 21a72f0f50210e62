//! Reservation-price provider — inventory-skewed quoting.
//!
//! Centers quotes on a reservation price shifted against the current
//! inventory (`mid - γσ²qτ`) and sets the half-spread from risk aversion and
//! volatility, floored by the step's spread constraint. Deterministic in the
//! market state: the horizon enters as a fixed fraction, never wall-clock
//! time.

use crate::domain::Quote;

use super::{MarketState, QuoteProvider};

#[derive(Debug, Clone)]
pub struct ReservationPriceQuoter {
    /// Risk aversion γ.
    pub risk_aversion: f64,
    /// Horizon fraction τ in (0, 1].
    pub time_horizon: f64,
    pub size: f64,
}

impl ReservationPriceQuoter {
    pub fn new(risk_aversion: f64, time_horizon: f64) -> Self {
        Self {
            risk_aversion,
            time_horizon,
            size: 1.0,
        }
    }

    fn reservation_price(&self, state: &MarketState) -> f64 {
        let inventory_risk = self.risk_aversion
            * state.volatility.powi(2)
            * state.inventory_qty
            * self.time_horizon;
        state.mid_price - inventory_risk
    }

    fn half_spread(&self, state: &MarketState) -> f64 {
        let gamma_sigma_sq = self.risk_aversion * state.volatility.powi(2);
        let optimal = (gamma_sigma_sq * self.time_horizon
            + (2.0 / self.risk_aversion) * (1.0 + self.risk_aversion / 2.0).ln())
            / 2.0;
        optimal.max(state.spread_constraint / 2.0)
    }
}

impl QuoteProvider for ReservationPriceQuoter {
    fn quote(&mut self, state: &MarketState) -> Option<Quote> {
        if state.mid_price <= 0.0 {
            return None;
        }
        let reservation = self.reservation_price(state);
        let half = self.half_spread(state);
        Some(Quote {
            bid_price: reservation - half,
            ask_price: reservation + half,
            bid_size: self.size,
            ask_size: self.size,
            timestamp: state.timestamp,
        })
    }

    fn name(&self) -> &'static str {
        "reservation_price"
    }
}
