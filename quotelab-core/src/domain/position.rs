//! Position — signed inventory with cash and realized-PnL accounting.

use serde::{Deserialize, Serialize};

use super::trade::TradeSide;

/// The simulator's single-instrument book.
///
/// Invariant (checked by the simulator after every step): the mark-to-market
/// identity `equity == cash + inventory_qty * mid` must agree with the PnL
/// decomposition `initial_capital + realized_pnl + unrealized_pnl - fees_paid`
/// within floating tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub inventory_qty: f64,
    pub cash: f64,
    pub avg_entry_price: f64,
    pub realized_pnl: f64,
    pub fees_paid: f64,
    initial_capital: f64,
}

impl Position {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            inventory_qty: 0.0,
            cash: initial_capital,
            avg_entry_price: 0.0,
            realized_pnl: 0.0,
            fees_paid: 0.0,
            initial_capital,
        }
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn is_flat(&self) -> bool {
        self.inventory_qty == 0.0
    }

    /// Mark-to-market equity at the given mid price.
    pub fn equity(&self, mid: f64) -> f64 {
        self.cash + self.inventory_qty * mid
    }

    /// Unrealized PnL of the open inventory at the given mid price.
    pub fn unrealized_pnl(&self, mid: f64) -> f64 {
        self.inventory_qty * (mid - self.avg_entry_price)
    }

    /// Apply one execution: move cash, update inventory and average entry,
    /// realize PnL on any reduced quantity.
    ///
    /// Crossing through zero realizes the closed leg and re-opens the
    /// remainder at the execution price.
    pub fn apply(&mut self, side: TradeSide, price: f64, quantity: f64, fee: f64) {
        debug_assert!(quantity >= 0.0 && fee >= 0.0);

        let delta = match side {
            TradeSide::Buy => quantity,
            TradeSide::Sell => -quantity,
        };
        match side {
            TradeSide::Buy => self.cash -= price * quantity,
            TradeSide::Sell => self.cash += price * quantity,
        }
        self.cash -= fee;
        self.fees_paid += fee;

        let old = self.inventory_qty;
        let new = old + delta;

        if old == 0.0 || old.signum() == delta.signum() {
            // Opening or adding: weighted-average entry.
            let total = old.abs() + quantity;
            if total > 0.0 {
                self.avg_entry_price =
                    (self.avg_entry_price * old.abs() + price * quantity) / total;
            }
        } else if new == 0.0 || new.signum() == old.signum() {
            // Reducing (possibly to flat): realize on the closed quantity.
            let closed = quantity.min(old.abs());
            self.realized_pnl += (price - self.avg_entry_price) * closed * old.signum();
            if new == 0.0 {
                self.avg_entry_price = 0.0;
            }
        } else {
            // Crossing zero: close the full old position, re-open the rest.
            let closed = old.abs();
            self.realized_pnl += (price - self.avg_entry_price) * closed * old.signum();
            self.avg_entry_price = price;
        }

        self.inventory_qty = new;
    }
}
