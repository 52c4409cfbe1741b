//! Least-squares Monte Carlo pricing engines.

pub mod longstaff_schwartz;
pub mod paths;

pub use longstaff_schwartz::LongstaffSchwartzEngine;
pub use paths::SimulatedPathSet;
