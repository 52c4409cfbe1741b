//! Bump-and-reprice Greeks through the public entry point.

use delta::compute_greeks;
use delta::core::{ExerciseStyle, OptionType, PricingEngine, PricingError};
use delta::engines::analytic::bs_greeks;
use delta::engines::{BinomialTreeEngine, LongstaffSchwartzEngine};
use delta::greeks::{BumpConfig, BumpSize, EngineSelector, GreekKind};
use delta::request::PricingRequest;

fn reference(option_type: OptionType, exercise_style: ExerciseStyle) -> PricingRequest {
    PricingRequest::new(100.0, 100.0, 1.0, 0.2, 0.05, 0.0, option_type, exercise_style).unwrap()
}

#[test]
fn reference_call_greeks_have_expected_signs() {
    let call = reference(OptionType::Call, ExerciseStyle::European);
    let engines = [
        EngineSelector::from(BinomialTreeEngine::new(500)),
        EngineSelector::from(LongstaffSchwartzEngine::new(50_000, 20, 42)),
    ];

    for engine in &engines {
        let g = compute_greeks(engine, &call, &BumpConfig::default()).unwrap();
        assert!(g.delta > 0.0 && g.delta < 1.0, "{}: delta {}", engine.name(), g.delta);
        assert!(g.vega > 0.0, "{}: vega {}", engine.name(), g.vega);
        assert!(g.theta < 0.0, "{}: theta {}", engine.name(), g.theta);
        assert!(g.rho > 0.0, "{}: rho {}", engine.name(), g.rho);
    }

    let tree = compute_greeks(&engines[0], &call, &BumpConfig::default()).unwrap();
    assert!(tree.gamma > 0.0);
}

#[test]
fn tree_greeks_track_closed_form() {
    let call = reference(OptionType::Call, ExerciseStyle::European);
    let g = compute_greeks(
        &EngineSelector::from(BinomialTreeEngine::new(1000)),
        &call,
        &BumpConfig::default(),
    )
    .unwrap();
    let cf = bs_greeks(&call);

    for kind in [GreekKind::Delta, GreekKind::Vega, GreekKind::Rho] {
        let rel = (g.get(kind) - cf.get(kind)).abs() / cf.get(kind).abs();
        assert!(rel < 2e-2, "{}: tree={} bs={}", kind.as_str(), g.get(kind), cf.get(kind));
    }
    assert!(g.gamma > 0.0);
}

#[test]
fn american_put_delta_is_steeper_than_european() {
    let selector = EngineSelector::from(BinomialTreeEngine::new(400));
    let eu = compute_greeks(
        &selector,
        &reference(OptionType::Put, ExerciseStyle::European),
        &BumpConfig::default(),
    )
    .unwrap();
    let am = compute_greeks(
        &selector,
        &reference(OptionType::Put, ExerciseStyle::American),
        &BumpConfig::default(),
    )
    .unwrap();

    assert!(eu.delta < 0.0 && am.delta < 0.0);
    assert!(am.delta < eu.delta);
}

#[test]
fn monte_carlo_greeks_are_stable_under_seed_reuse() {
    let put = reference(OptionType::Put, ExerciseStyle::European);
    let engine = EngineSelector::from(LongstaffSchwartzEngine::new(50_000, 10, 42));
    let g = compute_greeks(&engine, &put, &BumpConfig::default()).unwrap();
    let cf = bs_greeks(&put);

    assert!((g.delta - cf.delta).abs() < 0.02, "mc={} bs={}", g.delta, cf.delta);
    assert!((g.rho - cf.rho).abs() < 2.0, "mc={} bs={}", g.rho, cf.rho);
}

#[test]
fn theta_cannot_be_bumped_at_expiry() {
    let expired = reference(OptionType::Call, ExerciseStyle::American)
        .with_time_to_maturity(0.0)
        .unwrap();
    let err = compute_greeks(
        &EngineSelector::from(BinomialTreeEngine::new(100)),
        &expired,
        &BumpConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PricingError::InvalidParameter(_)));
}

#[test]
fn zero_volatility_falls_back_to_forward_vega() {
    let req = reference(OptionType::Call, ExerciseStyle::European)
        .with_volatility(0.0)
        .unwrap();
    let bumps = BumpConfig {
        vega_bump: BumpSize::Absolute(0.05),
        ..BumpConfig::default()
    };
    let g = compute_greeks(&EngineSelector::from(BinomialTreeEngine::new(200)), &req, &bumps)
        .unwrap();
    assert!(g.vega.is_finite() && g.vega >= 0.0);
    assert!((g.delta - 1.0).abs() < 1e-9);
}
