//! Closed-form engines.

pub mod black_scholes;

pub use black_scholes::{BlackScholesEngine, bs_greeks, bs_price};
