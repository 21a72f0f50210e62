//! Sweep scenario from the acceptance checklist: a 2x2x2 grid over 2 windows.

use quotelab_core::data::{synthetic_series, SyntheticConfig};
use quotelab_core::quoting::VariantSpec;
use quotelab_core::SafetyMode;
use quotelab_runner::{
    run_sweep, BacktestConfig, ExperimentGrid, RobustnessWeights,
};

/// 10 days of 15-minute bars: exactly two 5-day windows.
fn ten_day_series() -> quotelab_core::domain::BarSeries {
    synthetic_series(
        &SyntheticConfig {
            n_bars: 960,
            ..Default::default()
        },
        42,
    )
}

#[test]
fn two_by_two_by_two_grid_over_two_windows() {
    let grid = ExperimentGrid {
        budgets: vec![5_000.0, 10_000.0],
        variants: vec![VariantSpec::Conservative, VariantSpec::Balanced],
        seeds: vec![1, 2],
    };
    assert_eq!(grid.size(), 8);

    let config = BacktestConfig::default();
    let report = run_sweep(
        &grid,
        &config,
        &ten_day_series(),
        &RobustnessWeights::default(),
        SafetyMode::Paper,
    )
    .unwrap();

    // Exactly one candidate per grid tuple.
    assert_eq!(report.candidates.len(), 8);

    // Every tuple appears exactly once.
    let mut tuples: Vec<(String, u64, u64)> = report
        .candidates
        .iter()
        .map(|c| (c.variant_id.clone(), c.budget as u64, c.seed))
        .collect();
    tuples.sort();
    tuples.dedup();
    assert_eq!(tuples.len(), 8);

    for candidate in &report.candidates {
        assert!(candidate.pass_rate >= 0.0 && candidate.pass_rate <= 1.0);
        // Two windows: pass_rate is quantized to halves.
        let scaled = candidate.pass_rate * 2.0;
        assert!((scaled - scaled.round()).abs() < 1e-12);
        assert!(candidate.hard_fail_windows <= 2);
    }

    // At most one recommendation.
    if let Some(rec) = &report.recommended {
        assert!(rec.pass_rate >= config.gate.min_pass_rate);
        assert_eq!(rec.hard_fail_windows, 0);
        assert!(report.recommendation_reason.is_none());
    } else {
        assert!(report.recommendation_reason.is_some());
    }
}

#[test]
fn failed_gate_windows_stay_in_the_pass_rate_denominator() {
    // An impossibly high Sharpe floor fails every window; the denominator
    // must still be the full window count, driving pass_rate to exactly 0.
    let mut config = BacktestConfig::default();
    config.gate.min_sharpe = Some(1_000.0);

    let grid = ExperimentGrid {
        budgets: vec![10_000.0],
        variants: vec![VariantSpec::Balanced],
        seeds: vec![1],
    };
    let report = run_sweep(
        &grid,
        &config,
        &ten_day_series(),
        &RobustnessWeights::default(),
        SafetyMode::Paper,
    )
    .unwrap();

    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.candidates[0].pass_rate, 0.0);
    assert!(report.recommended.is_none());
    assert!(report.recommendation_reason.is_some());
}
