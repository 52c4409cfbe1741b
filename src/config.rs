//! Serde-loadable engine and bump defaults.
//!
//! Every field has a default, so a partial JSON document only overrides what it names:
//!
//! ```rust
//! use delta::config::DeltaConfig;
//!
//! let cfg = DeltaConfig::from_json_str(r#"{ "tree": { "steps": 1000 } }"#).unwrap();
//! assert_eq!(cfg.tree.steps, 1000);
//! assert_eq!(cfg.monte_carlo.seed, 42);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{DividendTreatment, PricingError};
use crate::engines::tree::DEFAULT_TREE_STEPS;
use crate::engines::{BinomialTreeEngine, LongstaffSchwartzEngine};
use crate::greeks::BumpConfig;
use crate::math::RngKind;

/// Binomial tree defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    pub steps: usize,
    pub dividends: DividendTreatment,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            steps: DEFAULT_TREE_STEPS,
            dividends: DividendTreatment::DriftAdjusted,
        }
    }
}

impl TreeSettings {
    pub fn engine(&self) -> BinomialTreeEngine {
        BinomialTreeEngine::new(self.steps).with_dividend_treatment(self.dividends)
    }
}

/// Longstaff-Schwartz defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LsmSettings {
    pub num_paths: usize,
    pub num_steps: usize,
    pub seed: u64,
    /// Polynomial degree of the continuation regression, `1..=6`.
    pub basis_degree: usize,
    pub antithetic: bool,
    pub rng: RngKind,
    pub dividends: DividendTreatment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr_tolerance: Option<f64>,
}

impl Default for LsmSettings {
    fn default() -> Self {
        Self {
            num_paths: 100_000,
            num_steps: 50,
            seed: 42,
            basis_degree: 2,
            antithetic: true,
            rng: RngKind::Xoshiro256PlusPlus,
            dividends: DividendTreatment::DriftAdjusted,
            stderr_tolerance: None,
        }
    }
}

impl LsmSettings {
    /// Builds the engine, rejecting an out-of-range basis degree.
    pub fn engine(&self) -> Result<LongstaffSchwartzEngine, PricingError> {
        let mut engine = LongstaffSchwartzEngine::new(self.num_paths, self.num_steps, self.seed)
            .with_basis_degree(self.basis_degree)?
            .with_antithetic(self.antithetic)
            .with_rng_kind(self.rng)
            .with_dividend_treatment(self.dividends);
        if let Some(tolerance) = self.stderr_tolerance {
            engine = engine.with_stderr_tolerance(tolerance);
        }
        Ok(engine)
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaConfig {
    pub tree: TreeSettings,
    pub monte_carlo: LsmSettings,
    pub bumps: BumpConfig,
}

impl DeltaConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PricingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PricingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let cfg = DeltaConfig::default();
        let json = cfg.to_json_pretty().unwrap();
        assert_eq!(DeltaConfig::from_json_str(&json).unwrap(), cfg);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let cfg = DeltaConfig::from_json_str(
            r#"{
                "monte_carlo": { "num_paths": 5000, "antithetic": false, "rng": "std_rng" },
                "bumps": { "theta_bump": { "absolute": 0.01 } }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.monte_carlo.num_paths, 5000);
        assert!(!cfg.monte_carlo.antithetic);
        assert_eq!(cfg.monte_carlo.rng, RngKind::StdRng);
        assert_eq!(cfg.monte_carlo.num_steps, 50);
        assert_eq!(cfg.tree, TreeSettings::default());
        assert_eq!(cfg.bumps.rho_bump, BumpConfig::default().rho_bump);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            DeltaConfig::from_json_str("{ not json"),
            Err(PricingError::Config(_))
        ));
    }

    #[test]
    fn settings_build_engines() {
        let cfg = DeltaConfig::default();
        assert_eq!(cfg.tree.engine().steps, 500);

        let engine = cfg.monte_carlo.engine().unwrap();
        assert_eq!(engine.seed, 42);
        assert_eq!(engine.basis.degree(), 2);

        let bad = LsmSettings {
            basis_degree: 9,
            ..LsmSettings::default()
        };
        assert!(matches!(bad.engine(), Err(PricingError::InvalidParameter(_))));
    }
}
