//! Pricing engine implementations.

pub mod analytic;
pub mod lsm;
pub mod tree;

pub use analytic::BlackScholesEngine;
pub use lsm::LongstaffSchwartzEngine;
pub use tree::BinomialTreeEngine;
