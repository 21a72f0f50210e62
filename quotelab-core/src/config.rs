//! Simulation configuration and the process safety mode.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Process-wide safety lock.
///
/// Passed explicitly into every runner entry point and recorded in every
/// report — never read from ambient global state. Backtest entry points
/// accept only `Paper`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyMode {
    #[default]
    Paper,
    Live,
}

impl SafetyMode {
    /// Reject anything but paper mode. Simulation never routes real orders.
    pub fn require_paper(self) -> Result<(), ConfigError> {
        match self {
            SafetyMode::Paper => Ok(()),
            SafetyMode::Live => Err(ConfigError::LiveModeRejected),
        }
    }
}

/// All knobs of one `ExecutionSimulator` run.
///
/// Every field is explicit — defaults live here and in TOML, never inside
/// logic paths. Inventory caps are expressed as multiples of the base order
/// quantity (which is itself derived from `order_notional_pct` of capital at
/// the first mid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    /// Fee per transaction as a fraction of notional.
    pub fee_rate: f64,
    /// Fraction of initial capital quoted per order.
    pub order_notional_pct: f64,
    pub min_order_qty: f64,
    pub max_order_qty: f64,
    /// Soft inventory cap, in base-order-quantity units. Order size tapers
    /// to zero as |inventory| approaches it.
    pub max_inventory_soft: f64,
    /// Hard inventory cap, in base-order-quantity units. Breaching it forces
    /// an immediate liquidation.
    pub max_inventory_hard: f64,
    /// Drawdown fraction that enters risk-off (widen-only quoting, scaled-down
    /// soft cap).
    pub drawdown_soft: f64,
    /// Drawdown fraction that liquidates and halts new entries for the rest
    /// of the run.
    pub drawdown_hard: f64,
    /// Bars to suppress new fills after any fill.
    pub cooldown_bars: u32,
    /// Minimum quoted spread, in basis points of mid.
    pub spread_constraint_bps: f64,
    /// Minimum net edge (gross spread minus two fee legs) required to trade,
    /// in basis points.
    pub min_edge_bps: f64,
    /// Rolling window (bars) for the volatility estimate.
    pub volatility_window: usize,
    /// Volatility level at which no spread widening applies. 0 disables
    /// volatility targeting.
    pub target_volatility: f64,
    /// How aggressively the spread widens above target volatility.
    pub vol_spread_scale: f64,
    /// One-bar move (bps) beyond which fills on the adverse side are
    /// suppressed. 0 disables the filter.
    pub adverse_return_bps: f64,
    /// Soft-cap multiplier applied while risk-off.
    pub risk_off_inventory_scale: f64,
    /// Decay constant (bps) of the fill-probability model.
    pub execution_sensitivity: f64,
    /// Master seed for fill randomness.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            fee_rate: 0.001,
            order_notional_pct: 0.02,
            min_order_qty: 1e-4,
            max_order_qty: 10.0,
            max_inventory_soft: 1.6,
            max_inventory_hard: 4.0,
            drawdown_soft: 0.15,
            drawdown_hard: 0.40,
            cooldown_bars: 4,
            spread_constraint_bps: 39.0,
            min_edge_bps: 2.4,
            volatility_window: 20,
            target_volatility: 0.0034,
            vol_spread_scale: 1.5,
            adverse_return_bps: 11.0,
            risk_off_inventory_scale: 0.33,
            execution_sensitivity: 120.0,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Check every parameter before any simulation starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::NonPositive { field, value })
            }
        }
        fn in_range(
            field: &'static str,
            value: f64,
            min: f64,
            max: f64,
        ) -> Result<(), ConfigError> {
            if value >= min && value <= max {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min,
                    max,
                })
            }
        }

        positive("initial_capital", self.initial_capital)?;
        in_range("fee_rate", self.fee_rate, 0.0, 0.1)?;
        in_range("order_notional_pct", self.order_notional_pct, 0.001, 0.5)?;
        positive("min_order_qty", self.min_order_qty)?;
        positive("max_order_qty", self.max_order_qty)?;
        if self.min_order_qty > self.max_order_qty {
            return Err(ConfigError::Inverted {
                low_field: "min_order_qty",
                low: self.min_order_qty,
                high_field: "max_order_qty",
                high: self.max_order_qty,
            });
        }
        positive("max_inventory_soft", self.max_inventory_soft)?;
        positive("max_inventory_hard", self.max_inventory_hard)?;
        if self.max_inventory_soft > self.max_inventory_hard {
            return Err(ConfigError::Inverted {
                low_field: "max_inventory_soft",
                low: self.max_inventory_soft,
                high_field: "max_inventory_hard",
                high: self.max_inventory_hard,
            });
        }
        in_range("drawdown_soft", self.drawdown_soft, 0.0, 1.0)?;
        in_range("drawdown_hard", self.drawdown_hard, 0.0, 1.0)?;
        if self.drawdown_soft > self.drawdown_hard {
            return Err(ConfigError::Inverted {
                low_field: "drawdown_soft",
                low: self.drawdown_soft,
                high_field: "drawdown_hard",
                high: self.drawdown_hard,
            });
        }
        if self.volatility_window < 2 {
            return Err(ConfigError::OutOfRange {
                field: "volatility_window",
                value: self.volatility_window as f64,
                min: 2.0,
                max: f64::MAX,
            });
        }
        in_range("spread_constraint_bps", self.spread_constraint_bps, 0.0, 10_000.0)?;
        in_range("min_edge_bps", self.min_edge_bps, 0.0, 10_000.0)?;
        in_range("target_volatility", self.target_volatility, 0.0, 1.0)?;
        in_range("vol_spread_scale", self.vol_spread_scale, 0.0, 100.0)?;
        in_range("adverse_return_bps", self.adverse_return_bps, 0.0, 10_000.0)?;
        in_range(
            "risk_off_inventory_scale",
            self.risk_off_inventory_scale,
            0.1,
            1.0,
        )?;
        positive("execution_sensitivity", self.execution_sensitivity)?;
        Ok(())
    }

    /// Base order quantity from the first traded mid: a fixed notional slice
    /// of initial capital, clamped to the order-size bounds.
    pub fn base_order_qty(&self, first_mid: f64) -> f64 {
        let qty = (self.initial_capital * self.order_notional_pct) / first_mid.max(1e-9);
        qty.clamp(self.min_order_qty, self.max_order_qty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capital_rejected() {
        let config = SimulationConfig {
            initial_capital: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "initial_capital",
                ..
            })
        ));
    }

    #[test]
    fn soft_cap_above_hard_cap_rejected() {
        let config = SimulationConfig {
            max_inventory_soft: 5.0,
            max_inventory_hard: 4.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Inverted { .. })));
    }

    #[test]
    fn drawdown_soft_above_hard_rejected() {
        let config = SimulationConfig {
            drawdown_soft: 0.5,
            drawdown_hard: 0.4,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Inverted { .. })));
    }

    #[test]
    fn base_order_qty_clamped() {
        let config = SimulationConfig::default();
        // 2% of 10_000 = 200 notional; at mid 100 that is 2.0 units.
        assert!((config.base_order_qty(100.0) - 2.0).abs() < 1e-10);
        // At an absurdly low mid the clamp to max_order_qty binds.
        assert!((config.base_order_qty(0.01) - config.max_order_qty).abs() < 1e-10);
    }

    #[test]
    fn live_mode_rejected() {
        assert!(SafetyMode::Paper.require_paper().is_ok());
        assert_eq!(
            SafetyMode::Live.require_paper(),
            Err(ConfigError::LiveModeRejected)
        );
    }

    #[test]
    fn config_toml_roundtrip_via_serde() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deser: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deser);
    }
}
