//! Named strategy variants — parameterizations of the quote providers.

use serde::{Deserialize, Serialize};

use super::{FixedSpreadQuoter, QuoteProvider, ReservationPriceQuoter};

/// A named, serializable strategy variant.
///
/// Variants are what sweeps enumerate: each maps to a provider
/// parameterization via `build_provider`. The set mirrors the shipped
/// presets; `Custom` keeps the grid open for calibration experiments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariantSpec {
    /// High risk aversion, short horizon: wide, defensive quotes.
    Conservative,
    /// Moderate risk aversion and horizon.
    Balanced,
    /// Lower risk aversion, longer horizon: tighter quotes that lean on the
    /// simulator's volatility-widening overlays for protection.
    Adaptive,
    /// Fixed fractional spread, no inventory skew.
    FixedSpread { half_spread_frac: f64 },
    /// Explicit reservation-price parameters.
    Custom {
        risk_aversion: f64,
        time_horizon: f64,
    },
}

impl VariantSpec {
    /// Stable identifier used in reports and seed derivation.
    pub fn id(&self) -> String {
        match self {
            VariantSpec::Conservative => "conservative".to_string(),
            VariantSpec::Balanced => "balanced".to_string(),
            VariantSpec::Adaptive => "adaptive".to_string(),
            VariantSpec::FixedSpread { half_spread_frac } => {
                format!("fixed_spread_{half_spread_frac}")
            }
            VariantSpec::Custom {
                risk_aversion,
                time_horizon,
            } => format!("custom_g{risk_aversion}_t{time_horizon}"),
        }
    }

    /// Parse a preset name; `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "conservative" => Some(VariantSpec::Conservative),
            "balanced" => Some(VariantSpec::Balanced),
            "adaptive" => Some(VariantSpec::Adaptive),
            _ => None,
        }
    }

    /// Instantiate the provider for this variant.
    pub fn build_provider(&self) -> Box<dyn QuoteProvider> {
        match self {
            VariantSpec::Conservative => Box::new(ReservationPriceQuoter::new(1.9, 0.5)),
            VariantSpec::Balanced => Box::new(ReservationPriceQuoter::new(1.5, 0.75)),
            VariantSpec::Adaptive => Box::new(ReservationPriceQuoter::new(0.9, 1.0)),
            VariantSpec::FixedSpread { half_spread_frac } => {
                Box::new(FixedSpreadQuoter::new(*half_spread_frac))
            }
            VariantSpec::Custom {
                risk_aversion,
                time_horizon,
            } => Box::new(ReservationPriceQuoter::new(*risk_aversion, *time_horizon)),
        }
    }
}
