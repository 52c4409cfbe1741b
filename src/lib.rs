//! Delta prices vanilla equity options on a Cox-Ross-Rubinstein binomial lattice or by
//! Longstaff-Schwartz least-squares Monte Carlo, and computes Greeks by bumping the
//! request and re-pricing through either engine.
//!
//! References used across modules include:
//! - Cox, Ross and Rubinstein (1979) for the recombining lattice.
//! - Longstaff and Schwartz (2001) for regression-based early exercise.
//! - Glasserman (2004) for Monte Carlo estimators and finite-difference Greeks.
//! - Hull, *Options, Futures, and Other Derivatives* (11th ed.), Ch. 13, 15, 17 and 21.
//!
//! Numerical considerations:
//! - Tree prices converge to Black-Scholes at `O(1/steps)` with an odd/even oscillation.
//! - Monte Carlo prices carry a standard error; American values are biased slightly low
//!   by the sub-optimal regression exercise policy.
//! - Greeks reuse the engine's configuration for every bumped re-pricing, so the Monte
//!   Carlo engine keeps its seed across a finite difference.
//!
//! # Feature Flags
//! - `parallel`: simulates Monte Carlo paths and runs Greek re-pricings on Rayon.
//!
//! # Quick Start
//! ```rust
//! use delta::core::{ExerciseStyle, OptionType};
//! use delta::greeks::{BumpConfig, EngineSelector};
//! use delta::engines::BinomialTreeEngine;
//! use delta::request::PricingRequest;
//!
//! let request = PricingRequest::builder()
//!     .spot(100.0)
//!     .strike(100.0)
//!     .time_to_maturity(1.0)
//!     .volatility(0.2)
//!     .risk_free_rate(0.05)
//!     .option_type(OptionType::Call)
//!     .exercise_style(ExerciseStyle::European)
//!     .build()
//!     .unwrap();
//!
//! let tree = delta::price_tree(&request, 500).unwrap();
//! assert!((tree.price - 10.4506).abs() < 1e-2);
//!
//! let mc = delta::price_monte_carlo(&request, 20_000, 20, 42).unwrap();
//! let (lo, hi) = mc.confidence_interval(0.95).unwrap();
//! assert!(lo < mc.price && mc.price < hi);
//!
//! let selector = EngineSelector::from(BinomialTreeEngine::new(200));
//! let greeks = delta::compute_greeks(&selector, &request, &BumpConfig::default()).unwrap();
//! assert!(greeks.delta > 0.0 && greeks.delta < 1.0);
//! ```

pub mod chain;
pub mod config;
pub mod core;
pub mod engines;
pub mod greeks;
pub mod math;
pub mod request;

use crate::core::{PricingEngine, PricingError, PricingResult};
use crate::engines::{BinomialTreeEngine, LongstaffSchwartzEngine};
use crate::greeks::{BumpConfig, EngineSelector, GreeksResult};
use crate::request::PricingRequest;

/// Prices `request` on a CRR lattice with `steps` steps.
pub fn price_tree(request: &PricingRequest, steps: usize) -> Result<PricingResult, PricingError> {
    BinomialTreeEngine::new(steps).price(request)
}

/// Prices `request` by Monte Carlo on antithetic pairs: discounted terminal payoffs for
/// European exercise, Longstaff-Schwartz with a quadratic basis for American exercise.
pub fn price_monte_carlo(
    request: &PricingRequest,
    n_paths: usize,
    n_steps: usize,
    seed: u64,
) -> Result<PricingResult, PricingError> {
    LongstaffSchwartzEngine::new(n_paths, n_steps, seed).price(request)
}

/// Bump-and-reprice Greeks through the selected engine.
pub fn compute_greeks(
    engine: &EngineSelector,
    request: &PricingRequest,
    bump_config: &BumpConfig,
) -> Result<GreeksResult, PricingError> {
    greeks::compute(engine, request, bump_config)
}

pub mod prelude {
    pub use crate::chain::{ChainRow, StrikeQuote, price_chain};
    pub use crate::config::{DeltaConfig, LsmSettings, TreeSettings};
    pub use crate::core::{
        DividendTreatment, ExerciseStyle, NumericalWarning, OptionType, PricingEngine,
        PricingError, PricingResult,
    };
    pub use crate::engines::{BinomialTreeEngine, BlackScholesEngine, LongstaffSchwartzEngine};
    pub use crate::greeks::{BumpConfig, BumpSize, EngineSelector, GreekKind, GreeksResult};
    pub use crate::request::PricingRequest;
    pub use crate::{compute_greeks, price_monte_carlo, price_tree};
}
