use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by request construction, the engines and the Greeks calculator.
///
/// No variant ever accompanies a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The pricing request itself is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// An engine or bump parameter is outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The discretization cannot produce a meaningful value.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
    /// Configuration could not be parsed or serialized.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PricingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Non-fatal numerical conditions reported next to a best-effort price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericalWarning {
    /// Extreme lattice nodes overflowed or underflowed; `log_reach` is `steps * ln(u)`.
    LatticeOverflow { steps: usize, log_reach: f64 },
    /// Monte Carlo standard error is larger than the caller accepts.
    StandardErrorAboveTolerance { stderr: f64, tolerance: f64 },
    /// Continuation regression was rank deficient at this exercise step.
    DegenerateRegression { step: usize },
}

impl std::fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LatticeOverflow { steps, log_reach } => write!(
                f,
                "lattice node overflow with {steps} steps (ln u^steps = {log_reach:.1})"
            ),
            Self::StandardErrorAboveTolerance { stderr, tolerance } => {
                write!(f, "standard error {stderr:.6} exceeds tolerance {tolerance:.6}")
            }
            Self::DegenerateRegression { step } => {
                write!(f, "rank-deficient continuation regression at step {step}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_category_prefix() {
        let err = PricingError::InvalidInput("spot must be > 0".to_string());
        assert_eq!(err.to_string(), "invalid input: spot must be > 0");

        let err = PricingError::InvalidParameter("steps must be > 0".to_string());
        assert_eq!(err.to_string(), "invalid parameter: steps must be > 0");
    }

    #[test]
    fn serde_json_errors_map_to_config() {
        let err: PricingError = serde_json::from_str::<f64>("not json").unwrap_err().into();
        assert!(matches!(err, PricingError::Config(_)));
    }

    #[test]
    fn warnings_render_human_readable() {
        let w = NumericalWarning::StandardErrorAboveTolerance {
            stderr: 0.25,
            tolerance: 0.1,
        };
        assert_eq!(w.to_string(), "standard error 0.250000 exceeds tolerance 0.100000");
    }
}
