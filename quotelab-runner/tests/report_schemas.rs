//! Report schema contracts: the JSON key sets downstream tooling matches on.

use quotelab_core::data::{synthetic_series, SyntheticConfig};
use quotelab_core::quoting::VariantSpec;
use quotelab_core::SafetyMode;
use quotelab_runner::{
    run_campaign, run_single, run_sweep, run_walk_forward, BacktestConfig, ExperimentGrid,
    MetricsArtifact, RobustnessWeights,
};

fn month_series() -> quotelab_core::domain::BarSeries {
    synthetic_series(
        &SyntheticConfig {
            n_bars: 2880,
            ..Default::default()
        },
        42,
    )
}

fn sorted_keys(value: &serde_json::Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .expect("expected a JSON object")
        .keys()
        .cloned()
        .collect();
    keys.sort();
    keys
}

#[test]
fn per_run_metrics_artifact_keys_are_exact() {
    let result = run_single(&BacktestConfig::default(), &month_series(), SafetyMode::Paper)
        .unwrap();
    let artifact = MetricsArtifact::from(&result.metrics);
    let value = serde_json::to_value(&artifact).unwrap();
    assert_eq!(
        sorted_keys(&value),
        vec![
            "calmar_ratio",
            "cvar_95_pct",
            "max_drawdown",
            "n_trades",
            "profit_factor",
            "sharpe_ratio",
            "sortino_ratio",
            "total_pnl",
            "ulcer_index",
            "win_rate",
        ]
    );
}

#[test]
fn walk_forward_report_keys_are_exact() {
    let report = run_walk_forward(
        &BacktestConfig::default(),
        &month_series(),
        true,
        SafetyMode::Paper,
    )
    .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(
        sorted_keys(&value),
        vec![
            "hard_fail_windows",
            "overall_pass",
            "pass_rate",
            "strict",
            "windows",
        ]
    );
    assert!(value["windows"].as_array().unwrap().len() > 1);
}

#[test]
fn sweep_report_keys_are_exact() {
    let grid = ExperimentGrid {
        budgets: vec![5_000.0, 10_000.0],
        variants: vec![VariantSpec::Conservative, VariantSpec::Balanced],
        seeds: vec![1, 2],
    };
    let report = run_sweep(
        &grid,
        &BacktestConfig::default(),
        &month_series(),
        &RobustnessWeights::default(),
        SafetyMode::Paper,
    )
    .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    let keys = sorted_keys(&value);
    // `recommendation_reason` appears only when `recommended` is null.
    if report.recommended.is_some() {
        assert_eq!(keys, vec!["candidates", "grid", "recommended"]);
    } else {
        assert_eq!(
            keys,
            vec!["candidates", "grid", "recommendation_reason", "recommended"]
        );
        assert!(value["recommended"].is_null());
    }
    assert_eq!(value["candidates"].as_array().unwrap().len(), 8);
}

#[test]
fn campaign_report_keys_are_exact() {
    let report = run_campaign(&BacktestConfig::default(), &month_series(), 3, SafetyMode::Paper)
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(sorted_keys(&value), vec!["files", "runs", "summary"]);
    // Each summary entry is a {min, mean, max} triple.
    let sharpe = &value["summary"]["sharpe_ratio"];
    assert_eq!(sorted_keys(sharpe), vec!["max", "mean", "min"]);
}
