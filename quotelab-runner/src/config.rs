//! Serializable backtest configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quotelab_core::quoting::VariantSpec;
use quotelab_core::{ConfigError, SimulationConfig};

use crate::gate::GateThresholds;

/// Walk-forward window parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Width of each evaluation window in days.
    pub window_days: i64,
    /// Keep at most this many of the most recent windows.
    pub max_windows: usize,
    /// Windows with fewer bars than this are dropped.
    pub min_bars: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_days: 5,
            max_windows: 12,
            min_bars: 200,
        }
    }
}

/// Complete configuration of one backtest: engine, strategy variant, gate
/// thresholds, window layout, and annualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub simulation: SimulationConfig,
    pub variant: VariantSpec,
    pub gate: GateThresholds,
    pub window: WindowConfig,
    /// Annualization factor for Sharpe/Sortino/Calmar.
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            variant: VariantSpec::Balanced,
            gate: GateThresholds::default(),
            window: WindowConfig::default(),
            periods_per_year: 252.0,
        }
    }
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

impl BacktestConfig {
    /// Validate every nested section up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.gate.validate()?;
        if self.periods_per_year <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "periods_per_year",
                value: self.periods_per_year,
            });
        }
        if self.window.window_days <= 0 {
            return Err(ConfigError::NonPositive {
                field: "window_days",
                value: self.window.window_days as f64,
            });
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigFileError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigFileError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Content hash of the full configuration, for run identity in reports.
    pub fn config_hash(&self) -> String {
        let json = serde_json::to_string(self).expect("config serialization cannot fail");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(BacktestConfig::default().validate().is_ok());
    }

    #[test]
    fn toml_roundtrip_with_overrides() {
        let raw = r#"
periods_per_year = 35040.0

[simulation]
initial_capital = 5000.0
fee_rate = 0.0002
cooldown_bars = 6

[variant]
type = "conservative"

[gate]
max_drawdown_pct = 0.25
min_pass_rate = 0.75

[window]
window_days = 7
max_windows = 8
"#;
        let config = BacktestConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.simulation.initial_capital, 5000.0);
        assert_eq!(config.simulation.cooldown_bars, 6);
        assert_eq!(config.variant, VariantSpec::Conservative);
        assert_eq!(config.gate.max_drawdown_pct, 0.25);
        assert_eq!(config.window.window_days, 7);
        assert_eq!(config.periods_per_year, 35040.0);
        // Unspecified fields keep their defaults.
        assert_eq!(config.window.min_bars, 200);
    }

    #[test]
    fn invalid_toml_values_are_rejected() {
        let raw = r#"
[simulation]
initial_capital = -100.0
"#;
        assert!(matches!(
            BacktestConfig::from_toml_str(raw),
            Err(ConfigFileError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            BacktestConfig::from_toml_str("simulation = ["),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn config_hash_is_stable_and_sensitive() {
        let a = BacktestConfig::default();
        let mut b = BacktestConfig::default();
        assert_eq!(a.config_hash(), b.config_hash());
        b.simulation.seed = 43;
        assert_ne!(a.config_hash(), b.config_hash());
    }
}
