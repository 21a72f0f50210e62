//! Error taxonomy for the engine.
//!
//! Three failure classes, all surfaced before or during a single run:
//! - `ConfigError` — rejected before any simulation starts
//! - `DataError` — malformed or insufficient input series
//! - `InvariantError` — equity accounting broke mid-run; fatal for that run,
//!   carries a full state dump
//!
//! A failed statistical gate is NOT an error — it is a legitimate
//! `pass: false` outcome reported by the runner.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Invalid or inconsistent configuration, caught by `validate()` up front.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{low_field} ({low}) must not exceed {high_field} ({high})")]
    Inverted {
        low_field: &'static str,
        low: f64,
        high_field: &'static str,
        high: f64,
    },
    #[error("live mode is not accepted by backtest entry points")]
    LiveModeRejected,
}

/// Malformed or insufficient market data. Fails fast, never silently truncates.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    #[error("bar {index} at {timestamp} failed sanity checks (NaN or non-positive price, inverted range)")]
    MalformedBar {
        index: usize,
        timestamp: DateTime<Utc>,
    },
    #[error("bar {index} at {timestamp} is not strictly after its predecessor")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<Utc>,
    },
    #[error("series has {got} bars, fewer than the required {need}")]
    TooShort { got: usize, need: usize },
    #[error("csv ingest failed: {0}")]
    Csv(String),
}

/// Equity accounting identity violated mid-run.
///
/// The dump carries everything needed to reproduce the step: both equity
/// derivations, the raw position components, and the bar position.
#[derive(Debug, Clone, Error, PartialEq)]
#[error(
    "equity invariant violated at bar {bar_index}: identity={identity_equity:.8} \
     pnl-decomposed={decomposed_equity:.8} (cash={cash:.8}, inventory={inventory_qty:.8}, \
     mid={mid_price:.8}, avg_entry={avg_entry_price:.8}, realized={realized_pnl:.8}, \
     fees={fees_paid:.8})"
)]
pub struct InvariantError {
    pub bar_index: usize,
    pub identity_equity: f64,
    pub decomposed_equity: f64,
    pub cash: f64,
    pub inventory_qty: f64,
    pub mid_price: f64,
    pub avg_entry_price: f64,
    pub realized_pnl: f64,
    pub fees_paid: f64,
}

/// Umbrella error for a single simulation run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages_name_the_field() {
        let err = ConfigError::NonPositive {
            field: "initial_capital",
            value: 0.0,
        };
        assert!(err.to_string().contains("initial_capital"));
    }

    #[test]
    fn invariant_error_dumps_state() {
        let err = InvariantError {
            bar_index: 7,
            identity_equity: 100.0,
            decomposed_equity: 99.0,
            cash: 50.0,
            inventory_qty: 0.5,
            mid_price: 100.0,
            avg_entry_price: 98.0,
            realized_pnl: 1.0,
            fees_paid: 0.1,
        };
        let msg = err.to_string();
        assert!(msg.contains("bar 7"));
        assert!(msg.contains("cash"));
        assert!(msg.contains("inventory"));
    }

    #[test]
    fn sim_error_wraps_variants() {
        let err: SimError = DataError::TooShort { got: 3, need: 10 }.into();
        assert!(matches!(err, SimError::Data(_)));
    }
}
