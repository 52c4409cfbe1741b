//! Module `engines::analytic::black_scholes`.
//!
//! Black-Scholes-Merton closed form with continuous dividend yield. It is the limit the
//! CRR lattice must converge to for European exercise, and the reference the tests and
//! benchmarks compare the numerical engines against.
//!
//! References: Hull (11th ed.) Ch. 15 and 17, Eq. (17.4)-(17.5).
use crate::core::{ExerciseStyle, OptionType, PricingEngine, PricingError, PricingResult};
use crate::greeks::GreeksResult;
use crate::math::{discount_factor, norm_cdf, norm_pdf};
use crate::request::PricingRequest;

/// Analytic Black-Scholes engine for European vanilla options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholesEngine;

impl BlackScholesEngine {
    /// Creates a Black-Scholes engine instance.
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn d1_d2(
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    expiry: f64,
) -> (f64, f64) {
    let sig_sqrt_t = vol * expiry.sqrt();
    let d1 =
        ((spot / strike).ln() + (rate - dividend_yield + 0.5 * vol * vol) * expiry) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// Black-Scholes-Merton price.
///
/// `expiry <= 0` returns intrinsic value; `vol <= 0` returns the discounted payoff of
/// the forward.
#[inline]
pub fn bs_price(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    expiry: f64,
) -> f64 {
    if expiry <= 0.0 {
        return option_type.payoff(spot, strike);
    }
    let df_r = discount_factor(rate, expiry);
    let df_q = discount_factor(dividend_yield, expiry);
    if vol <= 0.0 {
        return option_type.payoff(spot * df_q, strike * df_r);
    }

    let (d1, d2) = d1_d2(spot, strike, rate, dividend_yield, vol, expiry);
    match option_type {
        OptionType::Call => spot * df_q * norm_cdf(d1) - strike * df_r * norm_cdf(d2),
        OptionType::Put => strike * df_r * norm_cdf(-d2) - spot * df_q * norm_cdf(-d1),
    }
}

/// Closed-form sensitivities for the request, ignoring its exercise style.
///
/// Theta is per year of calendar time (`-dV/dT`). All Greeks are zero on the
/// `T = 0` and `σ = 0` boundaries.
pub fn bs_greeks(request: &PricingRequest) -> GreeksResult {
    let (s, k, r, q, vol, t) = (
        request.spot(),
        request.strike(),
        request.risk_free_rate(),
        request.dividend_yield(),
        request.volatility(),
        request.time_to_maturity(),
    );
    if t <= 0.0 || vol <= 0.0 {
        return GreeksResult::default();
    }

    let (d1, d2) = d1_d2(s, k, r, q, vol, t);
    let sqrt_t = t.sqrt();
    let df_q = discount_factor(q, t);
    let df_r = discount_factor(r, t);
    let pdf_d1 = norm_pdf(d1);

    let gamma = df_q * pdf_d1 / (s * vol * sqrt_t);
    let vega = s * df_q * pdf_d1 * sqrt_t;
    let decay = -s * df_q * pdf_d1 * vol / (2.0 * sqrt_t);

    let (delta, theta, rho) = match request.option_type() {
        OptionType::Call => (
            df_q * norm_cdf(d1),
            decay - r * k * df_r * norm_cdf(d2) + q * s * df_q * norm_cdf(d1),
            k * t * df_r * norm_cdf(d2),
        ),
        OptionType::Put => (
            df_q * (norm_cdf(d1) - 1.0),
            decay + r * k * df_r * norm_cdf(-d2) - q * s * df_q * norm_cdf(-d1),
            -k * t * df_r * norm_cdf(-d2),
        ),
    };

    GreeksResult {
        delta,
        gamma,
        vega,
        theta,
        rho,
        warnings: Vec::new(),
    }
}

impl PricingEngine for BlackScholesEngine {
    fn price(&self, request: &PricingRequest) -> Result<PricingResult, PricingError> {
        if request.exercise_style() != ExerciseStyle::European {
            return Err(PricingError::InvalidInput(
                "closed-form engine supports European exercise only".to_string(),
            ));
        }
        Ok(PricingResult::exact(bs_price(
            request.option_type(),
            request.spot(),
            request.strike(),
            request.risk_free_rate(),
            request.dividend_yield(),
            request.volatility(),
            request.time_to_maturity(),
        )))
    }

    fn name(&self) -> &'static str {
        "black_scholes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn black_scholes_known_value() {
        let call = bs_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        assert_relative_eq!(call, 10.4506, epsilon = 2e-4);

        let put = bs_price(OptionType::Put, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        assert_relative_eq!(put, 5.5735, epsilon = 2e-4);
    }

    #[test]
    fn put_call_parity_with_dividends() {
        let (s, k, r, q, sigma, t) = (100.0, 95.0, 0.03, 0.02, 0.22, 1.4);
        let c = bs_price(OptionType::Call, s, k, r, q, sigma, t);
        let p = bs_price(OptionType::Put, s, k, r, q, sigma, t);
        assert_relative_eq!(c - p, s * (-q * t).exp() - k * (-r * t).exp(), epsilon = 1e-10);
    }

    #[test]
    fn reference_greeks_for_atm_call() {
        let request = PricingRequest::new(
            100.0,
            100.0,
            1.0,
            0.2,
            0.05,
            0.0,
            OptionType::Call,
            ExerciseStyle::European,
        )
        .unwrap();
        let g = bs_greeks(&request);
        assert!((g.delta - 0.6368).abs() < 5e-4);
        assert!((g.gamma - 0.01876).abs() < 5e-5);
        assert!((g.theta - -6.414).abs() < 5e-3);
        assert!((g.vega - 37.524).abs() < 5e-3);
        assert!((g.rho - 53.232).abs() < 5e-3);
    }

    #[test]
    fn american_requests_are_rejected() {
        let request = PricingRequest::new(
            100.0,
            100.0,
            1.0,
            0.2,
            0.05,
            0.0,
            OptionType::Put,
            ExerciseStyle::American,
        )
        .unwrap();
        assert!(matches!(
            BlackScholesEngine.price(&request),
            Err(PricingError::InvalidInput(_))
        ));
    }
}
