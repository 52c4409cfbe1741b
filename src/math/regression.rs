//! Ordinary least squares on a monomial basis `{1, x, ..., x^degree}`.
//!
//! The normal equations are assembled from power sums in a single pass over the
//! samples and solved through an SVD, so rank-deficient systems (clustered or identical regressors,
//! fewer samples than basis functions) still return the minimum-norm fit instead of
//! failing.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::core::PricingError;

/// Largest supported polynomial degree.
pub const MAX_BASIS_DEGREE: usize = 6;

/// Monomial regression basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PolynomialBasis {
    degree: usize,
}

impl Default for PolynomialBasis {
    fn default() -> Self {
        Self { degree: 2 }
    }
}

impl TryFrom<usize> for PolynomialBasis {
    type Error = PricingError;

    fn try_from(degree: usize) -> Result<Self, Self::Error> {
        Self::new(degree)
    }
}

impl From<PolynomialBasis> for usize {
    fn from(basis: PolynomialBasis) -> Self {
        basis.degree
    }
}

impl PolynomialBasis {
    /// Creates a basis of the given degree.
    ///
    /// # Errors
    /// [`PricingError::InvalidParameter`] unless `1 <= degree <= MAX_BASIS_DEGREE`.
    pub fn new(degree: usize) -> Result<Self, PricingError> {
        if degree == 0 || degree > MAX_BASIS_DEGREE {
            return Err(PricingError::InvalidParameter(format!(
                "basis degree must be in 1..={MAX_BASIS_DEGREE}, got {degree}"
            )));
        }
        Ok(Self { degree })
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of basis functions.
    #[inline]
    pub fn len(&self) -> usize {
        self.degree + 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Least-squares fit of `ys` on the basis evaluated at `xs`.
    ///
    /// # Errors
    /// - [`PricingError::InvalidParameter`] when the slices differ in length or are empty.
    /// - [`PricingError::NumericalInstability`] when the SVD solve fails.
    pub fn fit(&self, xs: &[f64], ys: &[f64]) -> Result<RegressionFit, PricingError> {
        if xs.len() != ys.len() {
            return Err(PricingError::InvalidParameter(
                "regression inputs must have equal length".to_string(),
            ));
        }
        if xs.is_empty() {
            return Err(PricingError::InvalidParameter(
                "regression requires at least one sample".to_string(),
            ));
        }

        let n = self.len();
        let mut moments = vec![0.0_f64; 2 * self.degree + 1];
        let mut rhs = vec![0.0_f64; n];
        for (&x, &y) in xs.iter().zip(ys) {
            let mut p = 1.0;
            for (k, m) in moments.iter_mut().enumerate() {
                *m += p;
                if k < n {
                    rhs[k] += p * y;
                }
                p *= x;
            }
        }

        let xtx = DMatrix::from_fn(n, n, |i, j| moments[i + j]);
        let xty = DVector::from_vec(rhs);

        let svd = xtx.svd(true, true);
        let largest = svd.singular_values.max();
        let eps = (largest * 1.0e-12).max(f64::MIN_POSITIVE);
        let rank = svd.rank(eps);
        let coefficients = svd
            .solve(&xty, eps)
            .map_err(|e| PricingError::NumericalInstability(format!("regression solve: {e}")))?;

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PricingError::NumericalInstability(
                "regression produced non-finite coefficients".to_string(),
            ));
        }

        Ok(RegressionFit {
            coefficients,
            rank_deficient: rank < n,
        })
    }
}

/// Fitted polynomial.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionFit {
    coefficients: DVector<f64>,
    rank_deficient: bool,
}

impl RegressionFit {
    /// Coefficients in ascending power order.
    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.as_slice()
    }

    /// `true` when the normal equations were singular and the minimum-norm solution was used.
    pub fn is_rank_deficient(&self) -> bool {
        self.rank_deficient
    }

    /// Fitted value at `x` (Horner).
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc.mul_add(x, c))
    }
}
