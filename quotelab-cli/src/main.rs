//! QuoteLab CLI — backtest, gate, and rank market-making configurations.
//!
//! Commands:
//! - `run` — single backtest, per-run metrics JSON
//! - `walk-forward` — rolling window gate; `--strict` exits non-zero on fail
//! - `sweep` — grid robustness ranking with a recommendation
//! - `campaign` — repeat one configuration N times, min/mean/max summary
//!
//! Bars come from a CSV file (`timestamp,open,high,low,close,volume`) or the
//! seeded synthetic generator when no file is given. Everything runs in
//! paper mode; there is no order routing anywhere in this tree.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use quotelab_core::data::{read_bars_from_path, synthetic_series, SyntheticConfig};
use quotelab_core::domain::BarSeries;
use quotelab_core::quoting::VariantSpec;
use quotelab_core::SafetyMode;
use quotelab_runner::{
    candidates_to_csv, run_campaign, run_single, run_sweep, run_walk_forward, windows_to_csv,
    BacktestConfig, ExperimentGrid, MetricsArtifact, RobustnessWeights,
};

#[derive(Parser)]
#[command(
    name = "quotelab",
    about = "QuoteLab CLI — market-making backtest gating engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV bar series (timestamp,open,high,low,close,volume).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Bars of synthetic data when no CSV is given.
    #[arg(long, default_value_t = 2880)]
    synthetic_bars: usize,

    /// Seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    synthetic_seed: u64,

    /// Output directory for artifacts.
    #[arg(long, default_value = "artifacts")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single backtest and write per-run metrics JSON.
    Run {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Walk-forward window gate across the series.
    WalkForward {
        #[command(flatten)]
        common: CommonArgs,

        /// Exit non-zero when the gate does not pass.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Sweep a (budget, variant, seed) grid and rank candidates.
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        /// Comma-separated budgets.
        #[arg(long, default_value = "5000,10000")]
        budgets: String,

        /// Comma-separated variant presets.
        #[arg(long, default_value = "conservative,balanced,adaptive")]
        variants: String,

        /// Comma-separated master seeds.
        #[arg(long, default_value = "42")]
        seeds: String,
    },
    /// Repeat one configuration N times and summarize stability.
    Campaign {
        #[command(flatten)]
        common: CommonArgs,

        /// Number of repeated runs.
        #[arg(long, default_value_t = 10)]
        runs: usize,
    },
}

fn main() -> ExitCode {
    match run_cli(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run { common } => {
            let (config, series, stamp) = prepare(&common)?;
            let result = run_single(&config, &series, SafetyMode::Paper)?;
            let artifact = MetricsArtifact::from(&result.metrics);

            let path = common.output_dir.join(format!("{stamp}_run_metrics.json"));
            write_json(&path, &serde_json::to_value(&artifact)?)?;
            println!("{}", serde_json::to_string_pretty(&artifact)?);
            println!("report: {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::WalkForward { common, strict } => {
            let (config, series, stamp) = prepare(&common)?;
            let report = run_walk_forward(&config, &series, strict, SafetyMode::Paper)?;

            let json_path = common
                .output_dir
                .join(format!("{stamp}_walk_forward_report.json"));
            write_json(&json_path, &serde_json::to_value(&report)?)?;
            let csv_path = common
                .output_dir
                .join(format!("{stamp}_walk_forward_windows.csv"));
            std::fs::write(&csv_path, windows_to_csv(&report.windows)?)
                .with_context(|| format!("writing {}", csv_path.display()))?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            println!("report: {}", json_path.display());
            println!("windows: {}", csv_path.display());

            if strict && !report.overall_pass {
                return Ok(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sweep {
            common,
            budgets,
            variants,
            seeds,
        } => {
            let (config, series, stamp) = prepare(&common)?;
            let grid = ExperimentGrid {
                budgets: parse_budgets(&budgets)?,
                variants: parse_variants(&variants)?,
                seeds: parse_seeds(&seeds)?,
            };
            let report = run_sweep(
                &grid,
                &config,
                &series,
                &RobustnessWeights::default(),
                SafetyMode::Paper,
            )?;

            let json_path = common.output_dir.join(format!("{stamp}_sweep_report.json"));
            write_json(&json_path, &serde_json::to_value(&report)?)?;
            let csv_path = common.output_dir.join(format!("{stamp}_sweep_candidates.csv"));
            std::fs::write(&csv_path, candidates_to_csv(&report.candidates)?)
                .with_context(|| format!("writing {}", csv_path.display()))?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            println!("report: {}", json_path.display());
            println!("candidates: {}", csv_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Campaign { common, runs } => {
            let (config, series, stamp) = prepare(&common)?;
            let mut report = run_campaign(&config, &series, runs, SafetyMode::Paper)?;

            let path = common
                .output_dir
                .join(format!("{stamp}_campaign_report.json"));
            report.files.push(path.display().to_string());
            write_json(&path, &serde_json::to_value(&report)?)?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            println!("report: {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load config and bars, create the output directory, and stamp the run.
fn prepare(common: &CommonArgs) -> Result<(BacktestConfig, BarSeries, String)> {
    let config = match &common.config {
        Some(path) => BacktestConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BacktestConfig::default(),
    };

    let series = match &common.data {
        Some(path) => read_bars_from_path(path)
            .with_context(|| format!("loading bars from {}", path.display()))?,
        None => synthetic_series(
            &SyntheticConfig {
                n_bars: common.synthetic_bars,
                ..Default::default()
            },
            common.synthetic_seed,
        ),
    };

    std::fs::create_dir_all(&common.output_dir)
        .with_context(|| format!("creating {}", common.output_dir.display()))?;
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    Ok((config, series, stamp))
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

fn parse_budgets(raw: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let value: f64 = token
            .parse()
            .with_context(|| format!("invalid budget '{token}'"))?;
        anyhow::ensure!(value > 0.0, "budget must be positive, got {value}");
        out.push(value);
    }
    anyhow::ensure!(!out.is_empty(), "at least one budget is required");
    out.sort_by(|a, b| a.partial_cmp(b).expect("budgets are finite"));
    out.dedup();
    Ok(out)
}

fn parse_variants(raw: &str) -> Result<Vec<VariantSpec>> {
    let mut out = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let variant = VariantSpec::from_name(token)
            .with_context(|| format!("unknown variant '{token}' (expected conservative, balanced, adaptive)"))?;
        out.push(variant);
    }
    anyhow::ensure!(!out.is_empty(), "at least one variant is required");
    Ok(out)
}

fn parse_seeds(raw: &str) -> Result<Vec<u64>> {
    let mut out = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let seed: u64 = token
            .parse()
            .with_context(|| format!("invalid seed '{token}'"))?;
        out.push(seed);
    }
    anyhow::ensure!(!out.is_empty(), "at least one seed is required");
    out.sort_unstable();
    out.dedup();
    Ok(out)
}
