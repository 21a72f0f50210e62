//! QuoteLab Core — the market-making execution simulator.
//!
//! This crate contains the engine underneath the gating framework:
//! - Domain types (bars, quotes, positions, trades, equity curve points)
//! - The per-bar `ExecutionSimulator` with fee accounting, inventory limits,
//!   forced liquidation, and drawdown circuit breakers
//! - Risk overlays (volatility-targeted spreads, adverse-move filter)
//! - Pluggable quote providers behind a single `QuoteProvider` capability
//! - Deterministic BLAKE3 seed derivation for reproducible sweeps
//! - CSV ingestion and a synthetic series generator

pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod quoting;
pub mod rng;
pub mod sim;

pub use config::{SafetyMode, SimulationConfig};
pub use error::{ConfigError, DataError, InvariantError, SimError};
pub use rng::SeedHierarchy;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn domain_types_are_send_sync() {
        assert_send::<domain::Bar>();
        assert_sync::<domain::Bar>();
        assert_send::<domain::BarSeries>();
        assert_sync::<domain::BarSeries>();
        assert_send::<domain::Quote>();
        assert_sync::<domain::Quote>();
        assert_send::<domain::Position>();
        assert_sync::<domain::Position>();
        assert_send::<domain::Trade>();
        assert_sync::<domain::Trade>();
        assert_send::<domain::EquityCurvePoint>();
        assert_sync::<domain::EquityCurvePoint>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<SimulationConfig>();
        assert_sync::<SimulationConfig>();
        assert_send::<SafetyMode>();
        assert_sync::<SafetyMode>();
    }

    #[test]
    fn engine_types_are_send() {
        assert_send::<sim::ExecutionSimulator>();
        assert_send::<sim::SimRun>();
        assert_send::<SeedHierarchy>();
        assert_sync::<SeedHierarchy>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<SimError>();
        assert_sync::<SimError>();
    }
}
