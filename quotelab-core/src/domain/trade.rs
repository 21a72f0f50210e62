//! Trade — one executed fill or forced liquidation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A single execution against the simulator's book.
///
/// `quantity` is always positive; direction is carried by `side`.
/// `liquidation_flag` marks trades forced by the hard inventory cap or the
/// drawdown halt — those are mandatory and bypass every entry filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub side: TradeSide,
    pub price: f64,
    pub quantity: f64,
    pub fee: f64,
    pub liquidation_flag: bool,
    /// Mid price at execution, for post-hoc slippage inspection.
    pub mid_price: f64,
    /// Signed inventory after this trade was applied.
    pub inventory_after: f64,
}

impl Trade {
    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }

    /// Signed quantity: positive for buys, negative for sells.
    pub fn signed_quantity(&self) -> f64 {
        match self.side {
            TradeSide::Buy => self.quantity,
            TradeSide::Sell => -self.quantity,
        }
    }
}
