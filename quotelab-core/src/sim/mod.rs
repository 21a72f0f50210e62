//! The execution simulation engine.

pub mod fills;
pub mod overlays;
pub mod simulator;
pub mod volatility;

pub use simulator::{
    ExecutionSimulator, SimRun, EQUITY_TOLERANCE, HALT_LIQUIDATION_SLIPPAGE,
    HARD_CAP_LIQUIDATION_SLIPPAGE,
};
pub use volatility::{RollingVolatility, DEFAULT_VOLATILITY, VOL_EPSILON};

use rand::rngs::StdRng;

use crate::config::SimulationConfig;
use crate::domain::BarSeries;
use crate::error::SimError;
use crate::quoting::QuoteProvider;

/// Drive one full simulation: one fresh simulator over one bar series.
///
/// The provider is consulted every bar; the RNG must be seeded by the caller
/// (per grid tuple in sweeps) so that parallel execution order never changes
/// results.
pub fn run(
    series: &BarSeries,
    provider: &mut dyn QuoteProvider,
    config: &SimulationConfig,
    rng: StdRng,
) -> Result<SimRun, SimError> {
    let mut sim = ExecutionSimulator::new(config.clone(), rng)?;
    for bar in series.bars() {
        sim.step(bar, provider)?;
    }
    Ok(sim.finish())
}
