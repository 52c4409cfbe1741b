//! Greeks by bump-and-reprice.
//!
//! The calculator only sees the [`PricingEngine`] trait: every sensitivity is a
//! finite difference over full re-pricings of perturbed [`PricingRequest`] copies.
//! Engines carry their own configuration (tree steps, Monte Carlo seed), so each
//! bumped re-pricing of a Monte Carlo engine reuses the same seed and the sampling
//! noise largely cancels in the differences.
//!
//! Stencils are central where the perturbed input stays in its domain and one-sided
//! at the boundaries:
//!
//! | Greek | interior | boundary fallback |
//! |-------|----------|-------------------|
//! | delta | `(V(S+h) - V(S-h)) / 2h` | `(V(S+h) - V(S)) / h` when `S-h <= 0` |
//! | gamma | `(V(S+h) - 2V(S) + V(S-h)) / h^2` | `(V(S+2h) - 2V(S+h) + V(S)) / h^2` |
//! | vega  | `(V(σ+h) - V(σ-h)) / 2h` | `(V(σ+h) - V(σ)) / h` when `σ-h < 0` |
//! | theta | `(V(T-h) - V(T)) / h` | `(V(T) - V(T+h)) / h` when `T-h < 0` |
//! | rho   | `(V(r+h) - V(r-h)) / 2h` | none |

use serde::{Deserialize, Serialize};

use crate::core::{NumericalWarning, PricingEngine, PricingError, PricingResult};
use crate::engines::{BinomialTreeEngine, LongstaffSchwartzEngine};
use crate::request::PricingRequest;

/// Bump magnitude for a single input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpSize {
    /// Additive bump in absolute units.
    Absolute(f64),
    /// Relative bump as a fraction of the current value.
    Relative(f64),
}

impl BumpSize {
    /// Resolves the bump against the current input value.
    pub fn step(self, base: f64) -> Result<f64, PricingError> {
        let h = match self {
            Self::Absolute(h) => h,
            Self::Relative(fraction) => fraction * base.abs(),
        };
        if h.is_finite() && h > 0.0 {
            Ok(h)
        } else {
            Err(PricingError::InvalidParameter(format!(
                "bump {self:?} resolves to non-positive step {h} at base {base}"
            )))
        }
    }
}

/// Per-Greek bump sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpConfig {
    pub delta_bump: BumpSize,
    pub gamma_bump: BumpSize,
    pub vega_bump: BumpSize,
    /// Maturity bump in years.
    pub theta_bump: BumpSize,
    pub rho_bump: BumpSize,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            delta_bump: BumpSize::Relative(0.01),
            gamma_bump: BumpSize::Relative(0.01),
            vega_bump: BumpSize::Absolute(0.01),
            theta_bump: BumpSize::Absolute(1.0 / 365.0),
            rho_bump: BumpSize::Absolute(1.0e-4),
        }
    }
}

/// Sensitivity identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreekKind {
    Delta,
    Gamma,
    Vega,
    Theta,
    Rho,
}

impl GreekKind {
    pub const ALL: [GreekKind; 5] = [
        Self::Delta,
        Self::Gamma,
        Self::Vega,
        Self::Theta,
        Self::Rho,
    ];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Gamma => "gamma",
            Self::Vega => "vega",
            Self::Theta => "theta",
            Self::Rho => "rho",
        }
    }
}

/// Option sensitivities.
///
/// Theta is per year of calendar time, so it is usually negative for long options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreeksResult {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
    /// Advisories raised by any of the underlying re-pricings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<NumericalWarning>,
}

impl GreeksResult {
    /// Looks up a sensitivity by kind.
    pub fn get(&self, kind: GreekKind) -> f64 {
        match kind {
            GreekKind::Delta => self.delta,
            GreekKind::Gamma => self.gamma,
            GreekKind::Vega => self.vega,
            GreekKind::Theta => self.theta,
            GreekKind::Rho => self.rho,
        }
    }

    /// Iterates `(kind, value)` pairs in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (GreekKind, f64)> + '_ {
        GreekKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

/// Engine choice for callers that pick the numerical method at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSelector {
    Tree(BinomialTreeEngine),
    MonteCarlo(LongstaffSchwartzEngine),
}

impl From<BinomialTreeEngine> for EngineSelector {
    fn from(engine: BinomialTreeEngine) -> Self {
        Self::Tree(engine)
    }
}

impl From<LongstaffSchwartzEngine> for EngineSelector {
    fn from(engine: LongstaffSchwartzEngine) -> Self {
        Self::MonteCarlo(engine)
    }
}

impl PricingEngine for EngineSelector {
    fn price(&self, request: &PricingRequest) -> Result<PricingResult, PricingError> {
        match self {
            Self::Tree(engine) => engine.price(request),
            Self::MonteCarlo(engine) => engine.price(request),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Tree(engine) => engine.name(),
            Self::MonteCarlo(engine) => engine.name(),
        }
    }
}

/// Finite-difference stencil over indices into the priced scenario list.
#[derive(Debug, Clone, Copy)]
enum Stencil {
    /// `(V[to] - V[from]) / h`
    Slope { to: usize, from: usize, h: f64 },
    /// `(V[up] - V[down]) / 2h`
    Central { up: usize, down: usize, h: f64 },
    /// `(V[up] - 2 V[mid] + V[down]) / h^2`
    Curvature {
        up: usize,
        mid: usize,
        down: usize,
        h: f64,
    },
}

impl Stencil {
    fn evaluate(self, v: &[f64]) -> f64 {
        match self {
            Self::Slope { to, from, h } => (v[to] - v[from]) / h,
            Self::Central { up, down, h } => (v[up] - v[down]) / (2.0 * h),
            Self::Curvature { up, mid, down, h } => (v[up] - 2.0 * v[mid] + v[down]) / (h * h),
        }
    }
}

/// Distinct perturbed requests; index 0 is always the unbumped request.
struct ScenarioSet {
    requests: Vec<PricingRequest>,
}

impl ScenarioSet {
    fn new(base: PricingRequest) -> Self {
        Self {
            requests: vec![base],
        }
    }

    fn add(&mut self, request: PricingRequest) -> usize {
        if let Some(i) = self.requests.iter().position(|r| *r == request) {
            return i;
        }
        self.requests.push(request);
        self.requests.len() - 1
    }
}

const BASE: usize = 0;

/// Bump-and-reprice calculator bound to an engine.
#[derive(Debug, Clone)]
pub struct GreeksCalculator<'a, E> {
    engine: &'a E,
    bumps: BumpConfig,
}

impl<'a, E> GreeksCalculator<'a, E>
where
    E: PricingEngine + Sync,
{
    pub fn new(engine: &'a E, bumps: BumpConfig) -> Self {
        Self { engine, bumps }
    }

    /// Computes all five Greeks.
    pub fn compute(&self, request: &PricingRequest) -> Result<GreeksResult, PricingError> {
        self.compute_with_price(request).map(|(_, greeks)| greeks)
    }

    /// Computes all five Greeks and returns the unbumped pricing alongside them.
    pub fn compute_with_price(
        &self,
        request: &PricingRequest,
    ) -> Result<(PricingResult, GreeksResult), PricingError> {
        let mut scenarios = ScenarioSet::new(*request);
        let [delta, gamma, vega, theta, rho] = self.plan(request, &mut scenarios)?;

        let mut results = price_all(self.engine, &scenarios.requests)?;
        let values: Vec<f64> = results.iter().map(|r| r.price).collect();

        let mut warnings: Vec<NumericalWarning> = Vec::new();
        for warning in results.iter().flat_map(|r| r.warnings.iter()) {
            if !warnings.contains(warning) {
                warnings.push(*warning);
            }
        }

        let greeks = GreeksResult {
            delta: delta.evaluate(&values),
            gamma: gamma.evaluate(&values),
            vega: vega.evaluate(&values),
            theta: theta.evaluate(&values),
            rho: rho.evaluate(&values),
            warnings,
        };
        tracing::debug!(
            engine = self.engine.name(),
            repricings = values.len(),
            delta = greeks.delta,
            gamma = greeks.gamma,
            vega = greeks.vega,
            "greeks computed"
        );

        Ok((results.swap_remove(BASE), greeks))
    }

    fn plan(
        &self,
        request: &PricingRequest,
        scenarios: &mut ScenarioSet,
    ) -> Result<[Stencil; 5], PricingError> {
        let spot = request.spot();
        let vol = request.volatility();
        let expiry = request.time_to_maturity();
        let rate = request.risk_free_rate();

        let h = self.bumps.delta_bump.step(spot)?;
        let up = scenarios.add(request.with_spot(spot + h)?);
        let delta = if spot - h > 0.0 {
            let down = scenarios.add(request.with_spot(spot - h)?);
            Stencil::Central { up, down, h }
        } else {
            Stencil::Slope { to: up, from: BASE, h }
        };

        let h = self.bumps.gamma_bump.step(spot)?;
        let up = scenarios.add(request.with_spot(spot + h)?);
        let gamma = if spot - h > 0.0 {
            let down = scenarios.add(request.with_spot(spot - h)?);
            Stencil::Curvature {
                up,
                mid: BASE,
                down,
                h,
            }
        } else {
            let up2 = scenarios.add(request.with_spot(spot + 2.0 * h)?);
            Stencil::Curvature {
                up: up2,
                mid: up,
                down: BASE,
                h,
            }
        };

        let h = self.bumps.vega_bump.step(vol)?;
        let up = scenarios.add(request.with_volatility(vol + h)?);
        let vega = if vol - h >= 0.0 {
            let down = scenarios.add(request.with_volatility(vol - h)?);
            Stencil::Central { up, down, h }
        } else {
            Stencil::Slope { to: up, from: BASE, h }
        };

        if expiry == 0.0 {
            return Err(PricingError::InvalidParameter(
                "theta is undefined at zero maturity".to_string(),
            ));
        }
        let h = self.bumps.theta_bump.step(expiry)?;
        let theta = if expiry - h >= 0.0 {
            let shorter = scenarios.add(request.with_time_to_maturity(expiry - h)?);
            Stencil::Slope {
                to: shorter,
                from: BASE,
                h,
            }
        } else {
            let longer = scenarios.add(request.with_time_to_maturity(expiry + h)?);
            Stencil::Slope {
                to: BASE,
                from: longer,
                h,
            }
        };

        let h = self.bumps.rho_bump.step(rate)?;
        let up = scenarios.add(request.with_risk_free_rate(rate + h)?);
        let down = scenarios.add(request.with_risk_free_rate(rate - h)?);
        let rho = Stencil::Central { up, down, h };

        Ok([delta, gamma, vega, theta, rho])
    }
}

fn price_all<E>(engine: &E, requests: &[PricingRequest]) -> Result<Vec<PricingResult>, PricingError>
where
    E: PricingEngine + Sync,
{
    #[cfg(feature = "parallel")]
    let results = {
        use rayon::prelude::*;
        requests.par_iter().map(|r| engine.price(r)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let results = requests.iter().map(|r| engine.price(r)).collect();
    results
}

/// Computes Greeks for `request` with `engine`.
pub fn compute<E>(
    engine: &E,
    request: &PricingRequest,
    bumps: &BumpConfig,
) -> Result<GreeksResult, PricingError>
where
    E: PricingEngine + Sync,
{
    GreeksCalculator::new(engine, *bumps).compute(request)
}
