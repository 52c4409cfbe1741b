//! Module `engines::tree::binomial`.
//!
//! Cox-Ross-Rubinstein recombining lattice with backward induction for European and
//! American exercise.
//!
//! References: Hull (11th ed.) Ch. 13, Cox-Ross-Rubinstein (1979), and backward-induction recursions around Eq. (13.10).
//!
//! The tree is never materialized. Nodes are addressed by `(level, index)` with spot
//! `S * u^index * d^(level - index)`, and the rollback keeps two per-layer value
//! buffers that are swapped after each level.
//!
//! Numerical considerations: European prices converge to Black-Scholes at first order in
//! `1/steps` with the usual odd/even oscillation; `steps` is capped at
//! [`MAX_TREE_STEPS`] and extreme nodes outside the `f64` range are reported as
//! [`NumericalWarning::LatticeOverflow`].
use crate::core::{
    DiagKey, Diagnostics, DividendTreatment, NumericalWarning, PricingEngine, PricingError,
    PricingResult,
};
use crate::math::{discount_factor, growth_factor};
use crate::request::PricingRequest;

/// Largest accepted number of tree steps.
pub const MAX_TREE_STEPS: usize = 100_000;

/// Default number of tree steps.
pub const DEFAULT_TREE_STEPS: usize = 500;

const LN_MAX: f64 = 709.782_712_893_384;
const LN_MIN_POSITIVE: f64 = -708.396_418_532_264_1;

/// Per-step CRR parameters derived from a request and a step count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeModel {
    /// Number of levels below the root.
    pub steps: usize,
    /// Time step in years.
    pub dt: f64,
    /// Up multiplier `exp(σ√Δt)`.
    pub u: f64,
    /// Down multiplier `1/u`.
    pub d: f64,
    /// Risk-neutral up probability.
    pub p: f64,
    /// One-step discount factor `exp(-rΔt)`.
    pub discount: f64,
    ln_spot: f64,
    ln_u: f64,
}

impl LatticeModel {
    /// Derives `u, d, p` for a request with positive maturity and volatility.
    ///
    /// # Errors
    /// - [`PricingError::InvalidParameter`] for `steps == 0`, `T == 0` or `σ == 0`.
    /// - [`PricingError::NumericalInstability`] when `d < exp((r-q)Δt) < u` fails.
    pub fn new(
        request: &PricingRequest,
        steps: usize,
        dividends: DividendTreatment,
    ) -> Result<Self, PricingError> {
        if steps == 0 {
            return Err(PricingError::InvalidParameter(
                "binomial steps must be > 0".to_string(),
            ));
        }
        let t = request.time_to_maturity();
        let vol = request.volatility();
        if t <= 0.0 || vol <= 0.0 {
            return Err(PricingError::InvalidParameter(
                "lattice requires positive maturity and volatility".to_string(),
            ));
        }

        let dt = t / steps as f64;
        let ln_u = vol * dt.sqrt();
        let u = ln_u.exp();
        let d = 1.0 / u;
        let carry = dividends.carry(request.risk_free_rate(), request.dividend_yield());
        let growth = growth_factor(carry, dt);
        if !(d < growth && growth < u) {
            return Err(PricingError::NumericalInstability(format!(
                "no-arbitrage bound d < exp((r-q)dt) < u violated (d={d:.6}, growth={growth:.6}, u={u:.6}); increase steps"
            )));
        }
        let p = (growth - d) / (u - d);

        Ok(Self {
            steps,
            dt,
            u,
            d,
            p,
            discount: discount_factor(request.risk_free_rate(), dt),
            ln_spot: request.spot().ln(),
            ln_u,
        })
    }

    /// Underlying level at `(level, index)`, `0 <= index <= level`.
    #[inline]
    pub fn node_spot(&self, level: usize, index: usize) -> f64 {
        (self.ln_spot + (2.0 * index as f64 - level as f64) * self.ln_u).exp()
    }

    /// `true` when the extreme terminal nodes leave the representable `f64` range.
    pub fn overflows(&self) -> bool {
        let reach = self.steps as f64 * self.ln_u;
        self.ln_spot + reach >= LN_MAX || self.ln_spot - reach <= LN_MIN_POSITIVE
    }
}

/// Cox-Ross-Rubinstein binomial tree engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinomialTreeEngine {
    /// Number of tree steps.
    pub steps: usize,
    /// Dividend handling in the lattice drift.
    pub dividends: DividendTreatment,
}

impl Default for BinomialTreeEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TREE_STEPS)
    }
}

impl BinomialTreeEngine {
    /// Creates a tree engine with the given number of steps.
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            dividends: DividendTreatment::DriftAdjusted,
        }
    }

    /// Sets how the dividend yield enters the lattice drift.
    pub fn with_dividend_treatment(mut self, dividends: DividendTreatment) -> Self {
        self.dividends = dividends;
        self
    }

    fn validate(&self) -> Result<(), PricingError> {
        if self.steps == 0 {
            return Err(PricingError::InvalidParameter(
                "binomial steps must be > 0".to_string(),
            ));
        }
        if self.steps > MAX_TREE_STEPS {
            return Err(PricingError::InvalidParameter(format!(
                "binomial steps must be <= {MAX_TREE_STEPS}"
            )));
        }
        Ok(())
    }

    /// Zero-volatility lattice: a single deterministic chain of `steps` nodes.
    fn price_deterministic(&self, request: &PricingRequest) -> f64 {
        let t = request.time_to_maturity();
        let rate = request.risk_free_rate();
        let carry = self
            .dividends
            .carry(rate, request.dividend_yield());
        let spot = request.spot();

        if !request.exercise_style().is_american() {
            return discount_factor(rate, t) * request.payoff(spot * growth_factor(carry, t));
        }

        let dt = t / self.steps as f64;
        let disc = discount_factor(rate, dt);
        let mut value = request.payoff(spot * growth_factor(carry, t));
        for i in (0..self.steps).rev() {
            let exercise = request.payoff(spot * growth_factor(carry, i as f64 * dt));
            value = (disc * value).max(exercise);
        }
        value
    }

    fn rollback(&self, request: &PricingRequest, lattice: &LatticeModel, exact_nodes: bool) -> f64 {
        let steps = lattice.steps;
        let is_american = request.exercise_style().is_american();

        // spot * u^j * d^(level-j) = spot * d^level * (u/d)^j
        let ratio = lattice.u / lattice.d;
        let disc_p = lattice.discount * lattice.p;
        let disc_1mp = lattice.discount * (1.0 - lattice.p);

        let mut values = vec![0.0_f64; steps + 1];
        let mut next = vec![0.0_f64; steps + 1];
        {
            let mut st = lattice.node_spot(steps, 0);
            for (j, value) in values.iter_mut().enumerate() {
                let spot = if exact_nodes { lattice.node_spot(steps, j) } else { st };
                *value = request.payoff(spot);
                st *= ratio;
            }
        }

        for level in (0..steps).rev() {
            if is_american {
                let mut st = lattice.node_spot(level, 0);
                for j in 0..=level {
                    let continuation = disc_p.mul_add(values[j + 1], disc_1mp * values[j]);
                    let spot = if exact_nodes { lattice.node_spot(level, j) } else { st };
                    next[j] = continuation.max(request.payoff(spot));
                    st *= ratio;
                }
            } else {
                for j in 0..=level {
                    next[j] = disc_p.mul_add(values[j + 1], disc_1mp * values[j]);
                }
            }
            std::mem::swap(&mut values, &mut next);
        }

        values[0]
    }
}

impl PricingEngine for BinomialTreeEngine {
    fn price(&self, request: &PricingRequest) -> Result<PricingResult, PricingError> {
        self.validate()?;

        if request.time_to_maturity() == 0.0 {
            return Ok(PricingResult::exact(request.intrinsic()));
        }

        let mut diagnostics = Diagnostics::new();
        diagnostics.insert(DiagKey::NumSteps, self.steps as f64);
        diagnostics.insert(DiagKey::Vol, request.volatility());

        if request.volatility() == 0.0 {
            let price = self.price_deterministic(request);
            tracing::debug!(steps = self.steps, price, "deterministic lattice priced");
            return Ok(PricingResult {
                price,
                stderr: None,
                diagnostics,
                warnings: Vec::new(),
            });
        }

        let lattice = LatticeModel::new(request, self.steps, self.dividends)?;
        let mut warnings = Vec::new();
        let overflow = lattice.overflows();
        if overflow {
            let warning = NumericalWarning::LatticeOverflow {
                steps: self.steps,
                log_reach: lattice.steps as f64 * lattice.u.ln(),
            };
            tracing::warn!(%warning, "lattice nodes outside f64 range");
            warnings.push(warning);
        }

        let price = self.rollback(request, &lattice, overflow);

        diagnostics.insert(DiagKey::Dt, lattice.dt);
        diagnostics.insert(DiagKey::U, lattice.u);
        diagnostics.insert(DiagKey::Pu, lattice.p);
        tracing::debug!(
            steps = self.steps,
            u = lattice.u,
            p = lattice.p,
            price,
            "binomial tree priced"
        );

        Ok(PricingResult {
            price,
            stderr: None,
            diagnostics,
            warnings,
        })
    }

    fn name(&self) -> &'static str {
        "binomial_tree"
    }
}
