use serde::{Deserialize, Serialize};

/// Plain-vanilla option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Call option payoff profile.
    Call,
    /// Put option payoff profile.
    Put,
}

impl OptionType {
    /// Returns +1.0 for calls and -1.0 for puts.
    pub fn sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }

    /// Exercise value `max(±(S - K), 0)`.
    #[inline(always)]
    pub fn payoff(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

/// Exercise rights for an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStyle {
    /// Exercise only at expiry.
    European,
    /// Exercise at any time up to expiry.
    American,
}

impl ExerciseStyle {
    #[inline]
    pub fn is_american(self) -> bool {
        matches!(self, Self::American)
    }
}

/// How the continuous dividend yield enters the risk-neutral drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendTreatment {
    /// Drift `r - q`.
    #[default]
    DriftAdjusted,
    /// Drift `r`; the request's dividend yield is not used for growth.
    Ignored,
}

impl DividendTreatment {
    /// Carry rate used for the underlying's risk-neutral growth.
    #[inline]
    pub fn carry(self, rate: f64, dividend_yield: f64) -> f64 {
        match self {
            Self::DriftAdjusted => rate - dividend_yield,
            Self::Ignored => rate,
        }
    }
}
