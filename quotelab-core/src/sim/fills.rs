//! Fill model.
//!
//! A resting quote can only fill when the bar's high/low range crosses its
//! price. A crossed quote then fills with probability decaying exponentially
//! in its distance from mid, so deep touches remain likelier than marginal
//! ones. Quotes at or through the mid fill near-certainly.

use crate::domain::TradeSide;

/// Fill probability for an aggressive (at-or-through-mid) quote.
pub const AT_MID_FILL_PROB: f64 = 0.95;

/// Baseline fill probability for a crossed quote.
pub const BASE_PROB: f64 = 0.30;

/// Weight of the distance-decay term.
pub const DECAY_WEIGHT: f64 = 0.55;

/// Clamp bounds on the final probability.
pub const PROB_FLOOR: f64 = 0.01;
pub const PROB_CAP: f64 = 0.95;

/// Probability that a resting quote fills on this bar.
///
/// Returns 0.0 when the bar's range never reached the quote price — a flat
/// tape generates no fills. `sensitivity` is the decay constant in basis
/// points: larger values keep far quotes likelier to fill once touched.
pub fn execution_probability(
    quote_price: f64,
    mid: f64,
    side: TradeSide,
    low: f64,
    high: f64,
    sensitivity: f64,
) -> f64 {
    if mid <= 0.0 {
        return 0.0;
    }

    let distance_bps = match side {
        TradeSide::Buy => {
            if quote_price >= mid {
                return AT_MID_FILL_PROB;
            }
            if quote_price < low {
                return 0.0;
            }
            ((mid - quote_price) / mid * 10_000.0).max(0.0)
        }
        TradeSide::Sell => {
            if quote_price <= mid {
                return AT_MID_FILL_PROB;
            }
            if quote_price > high {
                return 0.0;
            }
            ((quote_price - mid) / mid * 10_000.0).max(0.0)
        }
    };

    let decay = (-distance_bps / sensitivity.max(1.0)).exp();
    (BASE_PROB + DECAY_WEIGHT * decay).clamp(PROB_FLOOR, PROB_CAP)
}
