//! Numerical building blocks shared by the engines: discounting, the standard normal
//! distribution, seedable normal generators, least-squares regression and sample
//! statistics.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

pub mod fast_norm;
pub mod regression;
pub mod rng;
pub mod stats;

pub use regression::{PolynomialBasis, RegressionFit};
pub use rng::{NormalSource, RngKind, Xoshiro256PlusPlus};
pub use stats::mean_and_stderr;

/// Continuously compounded discount factor `exp(-r t)`.
#[inline]
pub fn discount_factor(rate: f64, t: f64) -> f64 {
    (-rate * t).exp()
}

/// Continuously compounded growth of the underlying over `t` at carry `b`.
#[inline]
pub fn growth_factor(carry: f64, t: f64) -> f64 {
    (carry * t).exp()
}

/// Standard normal density.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    Normal::standard().pdf(x)
}

/// Standard normal cumulative distribution.
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}
