//! Property tests for simulator invariants.
//!
//! 1. Equity accounting identity holds after every step
//! 2. Peak equity is non-decreasing
//! 3. |inventory| is bounded by the hard cap at step completion
//! 4. Identical seeds reproduce identical ledgers

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use quotelab_core::data::{synthetic_series, SyntheticConfig};
use quotelab_core::domain::BarSeries;
use quotelab_core::quoting::FixedSpreadQuoter;
use quotelab_core::sim::{self, SimRun};
use quotelab_core::SimulationConfig;

fn run_sim(series: &BarSeries, config: &SimulationConfig, seed: u64) -> SimRun {
    let mut provider = FixedSpreadQuoter::new(0.002);
    sim::run(series, &mut provider, config, StdRng::seed_from_u64(seed)).unwrap()
}

fn active_config() -> SimulationConfig {
    // Filters relaxed so random paths actually trade.
    SimulationConfig {
        min_edge_bps: 0.0,
        adverse_return_bps: 0.0,
        cooldown_bars: 1,
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// `|equity - (cash + inventory * mid)| < 1e-6` at every recorded point.
    ///
    /// The simulator checks the identity internally and errors on violation,
    /// so a clean run plus a final spot check covers the property.
    #[test]
    fn equity_identity_holds(data_seed in 0u64..1000, fill_seed in 0u64..1000) {
        let series = synthetic_series(
            &SyntheticConfig { n_bars: 150, ..Default::default() },
            data_seed,
        );
        let run = run_sim(&series, &active_config(), fill_seed);

        let last_mid = series.bars().last().unwrap().mid_price;
        let pos = &run.final_position;
        let identity = pos.cash + pos.inventory_qty * last_mid;
        let last_equity = run.equity_curve.last().unwrap().equity;
        prop_assert!((identity - last_equity).abs() < 1e-6);
    }

    /// `peak_equity_t >= peak_equity_{t-1}` for all t.
    #[test]
    fn peak_equity_never_decreases(data_seed in 0u64..1000, fill_seed in 0u64..1000) {
        let series = synthetic_series(
            &SyntheticConfig { n_bars: 150, ..Default::default() },
            data_seed,
        );
        let run = run_sim(&series, &active_config(), fill_seed);
        for pair in run.equity_curve.windows(2) {
            prop_assert!(pair[1].peak_equity >= pair[0].peak_equity - 1e-12);
        }
    }

    /// The hard inventory cap is restored within the step that breaches it:
    /// every recorded trade leaves |inventory| strictly inside the cap.
    #[test]
    fn inventory_bounded_by_hard_cap(data_seed in 0u64..1000, fill_seed in 0u64..1000) {
        let config = SimulationConfig {
            max_inventory_soft: 0.8,
            max_inventory_hard: 1.2,
            ..active_config()
        };
        let series = synthetic_series(
            &SyntheticConfig { n_bars: 150, ..Default::default() },
            data_seed,
        );
        let run = run_sim(&series, &config, fill_seed);

        let first_mid = series.bars()[0].mid_price;
        let hard_units = config.max_inventory_hard * config.base_order_qty(first_mid);
        // Trades within a step may touch the cap; liquidation must bring the
        // step's final inventory back inside it.
        prop_assert!(run.final_position.inventory_qty.abs() < hard_units + 1e-9);
        for pair in run.trades.windows(2) {
            // No trade is ever followed by a non-liquidation trade while
            // outside the cap.
            if pair[0].inventory_after.abs() >= hard_units {
                prop_assert!(pair[1].liquidation_flag);
            }
        }
    }

    /// Identical `(seed, config, series)` produce bit-identical ledgers.
    #[test]
    fn runs_are_deterministic(data_seed in 0u64..1000, fill_seed in 0u64..1000) {
        let series = synthetic_series(
            &SyntheticConfig { n_bars: 100, ..Default::default() },
            data_seed,
        );
        let config = active_config();
        let a = run_sim(&series, &config, fill_seed);
        let b = run_sim(&series, &config, fill_seed);
        prop_assert_eq!(a.trades, b.trades);
        prop_assert_eq!(a.equity_curve, b.equity_curve);
    }
}
