//! Validated pricing request shared by every engine.
//!
//! [`PricingRequest`] is an immutable value object: the constructor and the builder are
//! the only ways to obtain one, and both reject out-of-domain inputs before any
//! computation happens. Perturbed copies for bump-and-reprice go through the same
//! validation.
//!
//! `time_to_maturity == 0` and `volatility == 0` are accepted; engines treat them as
//! the intrinsic-value and deterministic-growth boundary cases.

use serde::{Deserialize, Serialize};

use crate::core::{ExerciseStyle, OptionType, PricingError};

/// Contract and market inputs for one valuation.
///
/// # Examples
/// ```
/// use delta::core::{ExerciseStyle, OptionType};
/// use delta::request::PricingRequest;
///
/// let request = PricingRequest::builder()
///     .spot(100.0)
///     .strike(100.0)
///     .time_to_maturity(1.0)
///     .volatility(0.2)
///     .risk_free_rate(0.05)
///     .option_type(OptionType::Call)
///     .exercise_style(ExerciseStyle::European)
///     .build()
///     .unwrap();
/// assert_eq!(request.dividend_yield(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest", into = "RawRequest")]
pub struct PricingRequest {
    spot: f64,
    strike: f64,
    time_to_maturity: f64,
    volatility: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
    option_type: OptionType,
    exercise_style: ExerciseStyle,
}

impl PricingRequest {
    /// Builds and validates a request.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] when:
    /// - `spot <= 0` or `strike <= 0`
    /// - `time_to_maturity < 0` or `volatility < 0`
    /// - any input is not finite
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_maturity: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        option_type: OptionType,
        exercise_style: ExerciseStyle,
    ) -> Result<Self, PricingError> {
        let request = Self {
            spot,
            strike,
            time_to_maturity,
            volatility,
            risk_free_rate,
            dividend_yield,
            option_type,
            exercise_style,
        };
        request.validate()?;
        Ok(request)
    }

    /// Starts a request builder. Rates default to zero.
    #[inline]
    pub fn builder() -> PricingRequestBuilder {
        PricingRequestBuilder::default()
    }

    fn validate(&self) -> Result<(), PricingError> {
        let finite = [
            ("spot", self.spot),
            ("strike", self.strike),
            ("time_to_maturity", self.time_to_maturity),
            ("volatility", self.volatility),
            ("risk_free_rate", self.risk_free_rate),
            ("dividend_yield", self.dividend_yield),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PricingError::InvalidInput(format!("{name} must be finite")));
        }
        if self.spot <= 0.0 {
            return Err(PricingError::InvalidInput("spot must be > 0".to_string()));
        }
        if self.strike <= 0.0 {
            return Err(PricingError::InvalidInput("strike must be > 0".to_string()));
        }
        if self.time_to_maturity < 0.0 {
            return Err(PricingError::InvalidInput(
                "time_to_maturity must be >= 0".to_string(),
            ));
        }
        if self.volatility < 0.0 {
            return Err(PricingError::InvalidInput(
                "volatility must be >= 0".to_string(),
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Time to maturity in years.
    #[inline]
    pub fn time_to_maturity(&self) -> f64 {
        self.time_to_maturity
    }

    /// Annualized volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Continuously compounded risk-free rate.
    #[inline]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Continuously compounded dividend yield.
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    #[inline]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    #[inline]
    pub fn exercise_style(&self) -> ExerciseStyle {
        self.exercise_style
    }

    /// Immediate exercise value at the current spot.
    #[inline]
    pub fn intrinsic(&self) -> f64 {
        self.option_type.payoff(self.spot, self.strike)
    }

    /// Exercise value at an arbitrary underlying level.
    #[inline]
    pub fn payoff(&self, spot: f64) -> f64 {
        self.option_type.payoff(spot, self.strike)
    }

    pub fn with_spot(&self, spot: f64) -> Result<Self, PricingError> {
        Self { spot, ..*self }.validated()
    }

    pub fn with_strike(&self, strike: f64) -> Result<Self, PricingError> {
        Self { strike, ..*self }.validated()
    }

    pub fn with_volatility(&self, volatility: f64) -> Result<Self, PricingError> {
        Self {
            volatility,
            ..*self
        }
        .validated()
    }

    pub fn with_time_to_maturity(&self, time_to_maturity: f64) -> Result<Self, PricingError> {
        Self {
            time_to_maturity,
            ..*self
        }
        .validated()
    }

    pub fn with_risk_free_rate(&self, risk_free_rate: f64) -> Result<Self, PricingError> {
        Self {
            risk_free_rate,
            ..*self
        }
        .validated()
    }

    /// Same contract with the other exercise style.
    pub fn with_exercise_style(&self, exercise_style: ExerciseStyle) -> Self {
        Self {
            exercise_style,
            ..*self
        }
    }

    /// Same contract with the other payoff side.
    pub fn with_option_type(&self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..*self
        }
    }

    fn validated(self) -> Result<Self, PricingError> {
        self.validate()?;
        Ok(self)
    }
}

/// Builder for [`PricingRequest`].
#[derive(Debug, Clone, Default)]
pub struct PricingRequestBuilder {
    spot: Option<f64>,
    strike: Option<f64>,
    time_to_maturity: Option<f64>,
    volatility: Option<f64>,
    risk_free_rate: Option<f64>,
    dividend_yield: Option<f64>,
    option_type: Option<OptionType>,
    exercise_style: Option<ExerciseStyle>,
}

impl PricingRequestBuilder {
    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    #[inline]
    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    #[inline]
    pub fn time_to_maturity(mut self, time_to_maturity: f64) -> Self {
        self.time_to_maturity = Some(time_to_maturity);
        self
    }

    #[inline]
    pub fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    #[inline]
    pub fn risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = Some(risk_free_rate);
        self
    }

    #[inline]
    pub fn dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = Some(dividend_yield);
        self
    }

    #[inline]
    pub fn option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = Some(option_type);
        self
    }

    #[inline]
    pub fn exercise_style(mut self, exercise_style: ExerciseStyle) -> Self {
        self.exercise_style = Some(exercise_style);
        self
    }

    /// Validates and builds the request.
    ///
    /// Spot, strike, maturity, volatility and option type are required; rates
    /// default to zero and exercise style to European.
    pub fn build(self) -> Result<PricingRequest, PricingError> {
        let missing = |name: &str| PricingError::InvalidInput(format!("{name} is required"));
        PricingRequest::new(
            self.spot.ok_or_else(|| missing("spot"))?,
            self.strike.ok_or_else(|| missing("strike"))?,
            self.time_to_maturity
                .ok_or_else(|| missing("time_to_maturity"))?,
            self.volatility.ok_or_else(|| missing("volatility"))?,
            self.risk_free_rate.unwrap_or(0.0),
            self.dividend_yield.unwrap_or(0.0),
            self.option_type.ok_or_else(|| missing("option_type"))?,
            self.exercise_style.unwrap_or(ExerciseStyle::European),
        )
    }
}

/// Unvalidated wire form; deserialization funnels through [`PricingRequest::new`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawRequest {
    spot: f64,
    strike: f64,
    time_to_maturity: f64,
    volatility: f64,
    #[serde(default)]
    risk_free_rate: f64,
    #[serde(default)]
    dividend_yield: f64,
    option_type: OptionType,
    #[serde(default = "european")]
    exercise_style: ExerciseStyle,
}

fn european() -> ExerciseStyle {
    ExerciseStyle::European
}

impl TryFrom<RawRequest> for PricingRequest {
    type Error = PricingError;

    fn try_from(raw: RawRequest) -> Result<Self, Self::Error> {
        Self::new(
            raw.spot,
            raw.strike,
            raw.time_to_maturity,
            raw.volatility,
            raw.risk_free_rate,
            raw.dividend_yield,
            raw.option_type,
            raw.exercise_style,
        )
    }
}

impl From<PricingRequest> for RawRequest {
    fn from(r: PricingRequest) -> Self {
        Self {
            spot: r.spot,
            strike: r.strike,
            time_to_maturity: r.time_to_maturity,
            volatility: r.volatility,
            risk_free_rate: r.risk_free_rate,
            dividend_yield: r.dividend_yield,
            option_type: r.option_type,
            exercise_style: r.exercise_style,
        }
    }
}
