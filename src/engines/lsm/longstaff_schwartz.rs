//! Module `engines::lsm::longstaff_schwartz`.
//!
//! Least-squares Monte Carlo for American exercise, with plain discounted payoff
//! averaging for European exercise.
//!
//! References: Glasserman (2004), Longstaff and Schwartz (2001), Hull (11th ed.) Ch. 25, Monte Carlo estimators around Eq. (25.1).
//!
//! The backward pass carries, per path, the realized cash flow discounted to the current
//! step. At each interior step the in-the-money paths' cash flows are regressed on a
//! polynomial in `S/K`; a path exercises when its intrinsic value beats the fitted
//! continuation value, which locks its cash flow at that step.
//!
//! Numerical considerations: the estimate carries sampling noise reported as a standard
//! error, and the regression-based policy is sub-optimal, which biases American values
//! slightly low.
use rand::rngs::StdRng;

use crate::core::{
    DiagKey, Diagnostics, DividendTreatment, NumericalWarning, PricingEngine, PricingError,
    PricingResult,
};
use crate::math::{
    NormalSource, PolynomialBasis, RngKind, Xoshiro256PlusPlus, discount_factor, mean_and_stderr,
};
use crate::request::PricingRequest;

use super::paths::{GbmSpec, SimulatedPathSet};

/// Longstaff-Schwartz least-squares Monte Carlo engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LongstaffSchwartzEngine {
    /// Number of Monte Carlo paths.
    pub num_paths: usize,
    /// Number of time steps.
    pub num_steps: usize,
    /// RNG seed.
    pub seed: u64,
    /// Continuation regression basis.
    pub basis: PolynomialBasis,
    /// Mirrored normal pairs.
    pub antithetic: bool,
    /// Generator backend.
    pub rng: RngKind,
    /// Dividend handling in the simulated drift.
    pub dividends: DividendTreatment,
    /// Standard error above which a warning is attached to the result.
    pub stderr_tolerance: Option<f64>,
}

impl LongstaffSchwartzEngine {
    /// Creates a Longstaff-Schwartz engine with a quadratic basis and antithetic pairs.
    pub fn new(num_paths: usize, num_steps: usize, seed: u64) -> Self {
        Self {
            num_paths,
            num_steps,
            seed,
            basis: PolynomialBasis::default(),
            antithetic: true,
            rng: RngKind::default(),
            dividends: DividendTreatment::DriftAdjusted,
            stderr_tolerance: None,
        }
    }

    /// Uses a polynomial basis of the given degree.
    pub fn with_basis_degree(mut self, degree: usize) -> Result<Self, PricingError> {
        self.basis = PolynomialBasis::new(degree)?;
        Ok(self)
    }

    /// Enables/disables antithetic variates.
    pub fn with_antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = antithetic;
        self
    }

    /// Chooses the RNG backend for path simulation.
    pub fn with_rng_kind(mut self, rng: RngKind) -> Self {
        self.rng = rng;
        self
    }

    /// Uses a different seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets how the dividend yield enters the simulated drift.
    pub fn with_dividend_treatment(mut self, dividends: DividendTreatment) -> Self {
        self.dividends = dividends;
        self
    }

    /// Attaches a warning when the standard error exceeds `tolerance`.
    pub fn with_stderr_tolerance(mut self, tolerance: f64) -> Self {
        self.stderr_tolerance = Some(tolerance);
        self
    }

    fn validate(&self) -> Result<(), PricingError> {
        if self.num_paths == 0 {
            return Err(PricingError::InvalidParameter(
                "num_paths must be > 0".to_string(),
            ));
        }
        if self.num_steps == 0 {
            return Err(PricingError::InvalidParameter(
                "num_steps must be > 0".to_string(),
            ));
        }
        if let Some(tol) = self.stderr_tolerance
            && !(tol.is_finite() && tol > 0.0)
        {
            return Err(PricingError::InvalidParameter(
                "stderr tolerance must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Simulates the path set this engine would price on.
    pub fn simulate_paths(&self, request: &PricingRequest) -> SimulatedPathSet {
        let spec = GbmSpec {
            spot: request.spot(),
            carry: self
                .dividends
                .carry(request.risk_free_rate(), request.dividend_yield()),
            vol: request.volatility(),
            maturity: request.time_to_maturity(),
            num_steps: self.num_steps,
        };
        match self.rng {
            RngKind::Xoshiro256PlusPlus => simulate::<Xoshiro256PlusPlus>(&spec, self),
            RngKind::StdRng => simulate::<StdRng>(&spec, self),
        }
    }

    /// Runs the backward pass and returns per-path cash flows discounted to time 0.
    fn present_values(
        &self,
        request: &PricingRequest,
        paths: &SimulatedPathSet,
        warnings: &mut Vec<NumericalWarning>,
    ) -> Result<(Vec<f64>, usize), PricingError> {
        let dt = request.time_to_maturity() / self.num_steps as f64;
        let disc = discount_factor(request.risk_free_rate(), dt);
        let strike = request.strike();

        let mut values: Vec<f64> = paths.terminal_spots().map(|s| request.payoff(s)).collect();

        if !request.exercise_style().is_american() {
            let df = discount_factor(request.risk_free_rate(), request.time_to_maturity());
            values.iter_mut().for_each(|v| *v *= df);
            return Ok((values, 0));
        }

        let mut itm = Vec::with_capacity(paths.num_paths());
        let mut xs = Vec::with_capacity(paths.num_paths());
        let mut ys = Vec::with_capacity(paths.num_paths());
        let mut exercised = 0_usize;

        for ti in (1..self.num_steps).rev() {
            for value in &mut values {
                *value *= disc;
            }

            itm.clear();
            itm.extend((0..paths.num_paths()).filter(|&i| request.payoff(paths.spot(i, ti)) > 0.0));
            if itm.len() < self.basis.len() {
                continue;
            }

            xs.clear();
            ys.clear();
            xs.extend(itm.iter().map(|&i| paths.spot(i, ti) / strike));
            ys.extend(itm.iter().map(|&i| values[i]));

            // A single regressor value pins the continuation to the sample mean.
            let fit = if is_point_mass(&xs) {
                None
            } else {
                let fit = self.basis.fit(&xs, &ys)?;
                if fit.is_rank_deficient() {
                    warnings.push(NumericalWarning::DegenerateRegression { step: ti });
                }
                Some(fit)
            };
            let pooled = ys.iter().sum::<f64>() / ys.len() as f64;

            for (&i, &x) in itm.iter().zip(&xs) {
                let exercise = request.payoff(paths.spot(i, ti));
                let continuation = fit.as_ref().map_or(pooled, |f| f.evaluate(x));
                if exercise > continuation {
                    values[i] = exercise;
                    exercised += 1;
                }
            }
        }

        values.iter_mut().for_each(|v| *v *= disc);
        Ok((values, exercised))
    }
}

fn is_point_mass(xs: &[f64]) -> bool {
    let (lo, hi) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    hi - lo <= 1e-12 * hi.abs().max(1.0)
}

fn simulate<R: NormalSource>(spec: &GbmSpec, engine: &LongstaffSchwartzEngine) -> SimulatedPathSet {
    SimulatedPathSet::simulate::<R>(spec, engine.num_paths, engine.seed, engine.antithetic)
}

impl PricingEngine for LongstaffSchwartzEngine {
    fn price(&self, request: &PricingRequest) -> Result<PricingResult, PricingError> {
        self.validate()?;

        if request.time_to_maturity() == 0.0 {
            return Ok(PricingResult {
                stderr: Some(0.0),
                ..PricingResult::exact(request.intrinsic())
            });
        }

        let paths = self.simulate_paths(request);
        let mut warnings = Vec::new();
        let (pv, exercised) = self.present_values(request, &paths, &mut warnings)?;

        let (mean, stderr) = if self.antithetic {
            let pairs: Vec<f64> = pv.chunks_exact(2).map(|p| 0.5 * (p[0] + p[1])).collect();
            mean_and_stderr(&pairs)
        } else {
            mean_and_stderr(&pv)
        };
        let price = mean;

        if let Some(tolerance) = self.stderr_tolerance
            && stderr > tolerance
        {
            warnings.push(NumericalWarning::StandardErrorAboveTolerance { stderr, tolerance });
        }
        for warning in &warnings {
            tracing::warn!(%warning, "longstaff-schwartz advisory");
        }

        let mut diagnostics = Diagnostics::new();
        diagnostics.insert(DiagKey::NumPaths, paths.num_paths() as f64);
        diagnostics.insert(DiagKey::NumSteps, self.num_steps as f64);
        diagnostics.insert(DiagKey::Vol, request.volatility());
        diagnostics.insert(DiagKey::BasisDegree, self.basis.degree() as f64);
        diagnostics.insert(DiagKey::ExercisedPaths, exercised as f64);
        tracing::debug!(
            num_paths = paths.num_paths(),
            num_steps = self.num_steps,
            price,
            stderr,
            exercised,
            "longstaff-schwartz priced"
        );

        Ok(PricingResult {
            price,
            stderr: Some(stderr),
            diagnostics,
            warnings,
        })
    }

    fn name(&self) -> &'static str {
        "longstaff_schwartz"
    }
}
