//! Tree-based pricing engines.

pub mod binomial;

pub use binomial::{BinomialTreeEngine, DEFAULT_TREE_STEPS, LatticeModel, MAX_TREE_STEPS};
