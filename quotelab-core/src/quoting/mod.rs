//! Quote providers — the pluggable quoting-model boundary.
//!
//! The simulator consumes quoting decisions through a single capability:
//! `quote(state) -> Option<Quote>`. Strategy selection is dependency
//! injection of a trait object, not subclassing. The providers here are
//! deliberately small; the quoting math itself is an external collaborator.

mod fixed_spread;
mod reservation_price;
mod variant;

pub use fixed_spread::FixedSpreadQuoter;
pub use reservation_price::ReservationPriceQuoter;
pub use variant::VariantSpec;

use chrono::{DateTime, Utc};

/// Everything a provider may look at when deciding its quote.
///
/// `spread_constraint` is the effective minimum spread for this step in
/// price units — already widened for the current volatility regime and
/// risk-off state by the simulator's overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketState {
    pub timestamp: DateTime<Utc>,
    pub bar_index: usize,
    pub mid_price: f64,
    pub volatility: f64,
    pub inventory_qty: f64,
    pub spread_constraint: f64,
}

/// The quoting capability.
///
/// Returning `None` skips the step (no orders in the market). Providers must
/// be deterministic in `state` for run reproducibility.
pub trait QuoteProvider: Send {
    fn quote(&mut self, state: &MarketState) -> Option<crate::domain::Quote>;

    fn name(&self) -> &'static str;
}
