use std::fmt::Debug;

use delta::chain::{StrikeQuote, price_chain};
use delta::config::DeltaConfig;
use delta::core::{ExerciseStyle, NumericalWarning, OptionType, PricingEngine};
use delta::engines::LongstaffSchwartzEngine;
use delta::greeks::BumpConfig;
use delta::request::PricingRequest;
use serde::Serialize;
use serde::de::DeserializeOwned;

fn assert_roundtrip<T>(value: &T)
where
    T: Serialize + DeserializeOwned + PartialEq + Debug,
{
    let json = serde_json::to_vec_pretty(value).expect("json serialize");
    let from_json: T = serde_json::from_slice(&json).expect("json deserialize");
    assert_eq!(from_json, *value, "json roundtrip mismatch");
}

fn request() -> PricingRequest {
    PricingRequest::new(
        42.0,
        40.0,
        0.5,
        0.3,
        0.04,
        0.01,
        OptionType::Put,
        ExerciseStyle::American,
    )
    .unwrap()
}

#[test]
fn request_and_config_roundtrip() {
    assert_roundtrip(&request());
    assert_roundtrip(&DeltaConfig::default());
}

#[test]
fn request_json_is_validated_on_deserialize() {
    let json = r#"{
        "spot": -1.0, "strike": 40.0, "time_to_maturity": 0.5, "volatility": 0.3,
        "risk_free_rate": 0.04, "dividend_yield": 0.0,
        "option_type": "put", "exercise_style": "american"
    }"#;
    let err = serde_json::from_str::<PricingRequest>(json).unwrap_err();
    assert!(err.to_string().contains("spot"), "{err}");
}

#[test]
fn pricing_outputs_roundtrip() {
    let engine = LongstaffSchwartzEngine::new(2_000, 10, 3).with_stderr_tolerance(1e-6);
    let result = engine.price(&request()).unwrap();
    assert!(matches!(
        result.warnings.last(),
        Some(NumericalWarning::StandardErrorAboveTolerance { .. })
    ));
    assert_roundtrip(&result);

    let rows = price_chain(
        &request(),
        &[StrikeQuote::new(38.0, Some(0.28)), StrikeQuote::new(42.0, None)],
        &LongstaffSchwartzEngine::new(2_000, 10, 3),
        &BumpConfig::default(),
    )
    .unwrap();
    assert!(rows.iter().all(|row| row.stderr.is_some()));
    assert_roundtrip(&rows);
}
