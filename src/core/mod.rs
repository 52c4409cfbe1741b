//! Core traits, common domain types, and library-wide result/error structures.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::request::PricingRequest;

pub mod error;
pub mod types;

pub use error::{NumericalWarning, PricingError};
pub use types::*;

/// Pricing engine abstraction over a validated request.
///
/// Implementations are stateless with respect to the request: every call owns its
/// lattice or path buffers and drops them on return, so engines are `Sync` and can
/// be shared across threads.
pub trait PricingEngine {
    /// Prices the request.
    fn price(&self, request: &PricingRequest) -> Result<PricingResult, PricingError>;

    /// Short engine identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Compact key set for engine diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagKey {
    BasisDegree,
    Dt,
    ExercisedPaths,
    NumPaths,
    NumSteps,
    Pu,
    U,
    Vol,
}

impl DiagKey {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasisDegree => "basis_degree",
            Self::Dt => "dt",
            Self::ExercisedPaths => "exercised_paths",
            Self::NumPaths => "num_paths",
            Self::NumSteps => "num_steps",
            Self::Pu => "pu",
            Self::U => "u",
            Self::Vol => "vol",
        }
    }
}

/// Inline diagnostics storage used in [`PricingResult`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: [Option<(DiagKey, f64)>; 8],
}

impl Diagnostics {
    pub const CAPACITY: usize = 8;

    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Inserts or replaces a value. Keys beyond capacity are ignored; the key set is
    /// smaller than [`Self::CAPACITY`] so this never happens in practice.
    #[inline]
    pub fn insert(&mut self, key: DiagKey, value: f64) -> Option<f64> {
        for (entry_key, existing) in self.entries.iter_mut().flatten() {
            if *entry_key == key {
                let prev = *existing;
                *existing = value;
                return Some(prev);
            }
        }
        if let Some(slot) = self.entries.iter_mut().find(|e| e.is_none()) {
            *slot = Some((key, value));
        }
        None
    }

    #[inline]
    pub fn get(&self, key: DiagKey) -> Option<f64> {
        self.iter()
            .find_map(|(entry_key, value)| (entry_key == key).then_some(value))
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (DiagKey, f64)> + '_ {
        self.entries.iter().filter_map(|e| *e)
    }
}

/// Unified engine result payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Present value.
    pub price: f64,
    /// Standard error of the estimate (Monte Carlo only).
    pub stderr: Option<f64>,
    /// Engine-specific scalar diagnostics.
    pub diagnostics: Diagnostics,
    /// Advisory numerical conditions met while pricing.
    pub warnings: Vec<NumericalWarning>,
}

impl PricingResult {
    /// Result with no sampling error, diagnostics or warnings.
    pub fn exact(price: f64) -> Self {
        Self {
            price,
            stderr: None,
            diagnostics: Diagnostics::new(),
            warnings: Vec::new(),
        }
    }

    /// Half-width of the two-sided normal confidence interval at `level` (e.g. 0.95).
    ///
    /// Returns `None` for engines without sampling error or when `level` is not in `(0, 1)`.
    pub fn half_width(&self, level: f64) -> Option<f64> {
        let stderr = self.stderr?;
        if !(level > 0.0 && level < 1.0) {
            return None;
        }
        let z = Normal::new(0.0, 1.0).ok()?.inverse_cdf(0.5 + 0.5 * level);
        Some(z * stderr)
    }

    /// Two-sided confidence interval `(lo, hi)` around the price.
    pub fn confidence_interval(&self, level: f64) -> Option<(f64, f64)> {
        let hw = self.half_width(level)?;
        Some((self.price - hw, self.price + hw))
    }

    /// `true` when no advisory condition was raised.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
