//! Strike-ladder valuation.
//!
//! Prices every strike of a quoted chain against one template request and attaches
//! bump-and-reprice Greeks to each row. Quotes without a usable implied volatility
//! are priced at [`DEFAULT_IMPLIED_VOL`].

use serde::{Deserialize, Serialize};

use crate::core::{PricingEngine, PricingError};
use crate::greeks::{BumpConfig, GreeksCalculator, GreeksResult};
use crate::request::PricingRequest;

/// Volatility used for quotes that carry no implied volatility.
pub const DEFAULT_IMPLIED_VOL: f64 = 0.20;

/// One strike of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeQuote {
    pub strike: f64,
    #[serde(default)]
    pub implied_vol: Option<f64>,
}

impl StrikeQuote {
    pub fn new(strike: f64, implied_vol: Option<f64>) -> Self {
        Self {
            strike,
            implied_vol,
        }
    }

    /// Quoted volatility, or the default when missing, negative or non-finite.
    pub fn volatility(&self) -> f64 {
        self.implied_vol
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_IMPLIED_VOL)
    }
}

/// Valuation of one strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRow {
    pub strike: f64,
    /// Volatility the row was priced at.
    pub volatility: f64,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<f64>,
    pub greeks: GreeksResult,
}

/// Prices each quote as `template` with the quote's strike and volatility.
///
/// Fails on the first invalid strike; no partial ladder is returned.
pub fn price_chain<E>(
    template: &PricingRequest,
    quotes: &[StrikeQuote],
    engine: &E,
    bumps: &BumpConfig,
) -> Result<Vec<ChainRow>, PricingError>
where
    E: PricingEngine + Sync,
{
    let calculator = GreeksCalculator::new(engine, *bumps);
    let rows = quotes
        .iter()
        .map(|quote| -> Result<ChainRow, PricingError> {
            let volatility = quote.volatility();
            let request = template
                .with_strike(quote.strike)?
                .with_volatility(volatility)?;
            let (base, greeks) = calculator.compute_with_price(&request)?;
            Ok(ChainRow {
                strike: quote.strike,
                volatility,
                price: base.price,
                stderr: base.stderr,
                greeks,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(engine = engine.name(), rows = rows.len(), "chain priced");
    Ok(rows)
}
