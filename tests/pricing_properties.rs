//! Model-independent properties both engines must satisfy.

use approx::assert_relative_eq;
use delta::core::{ExerciseStyle, OptionType, PricingEngine, PricingError};
use delta::engines::analytic::bs_price;
use delta::engines::{BinomialTreeEngine, LongstaffSchwartzEngine};
use delta::request::PricingRequest;
use delta::{price_monte_carlo, price_tree};

fn request(
    spot: f64,
    vol: f64,
    option_type: OptionType,
    exercise_style: ExerciseStyle,
) -> PricingRequest {
    PricingRequest::builder()
        .spot(spot)
        .strike(100.0)
        .time_to_maturity(1.0)
        .volatility(vol)
        .risk_free_rate(0.05)
        .dividend_yield(0.0)
        .option_type(option_type)
        .exercise_style(exercise_style)
        .build()
        .unwrap()
}

fn reference_call() -> PricingRequest {
    request(100.0, 0.2, OptionType::Call, ExerciseStyle::European)
}

#[test]
fn tree_converges_to_black_scholes() {
    let bs = bs_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0);

    let mut prev_err = f64::INFINITY;
    for steps in [100, 200, 500, 1000] {
        let err = (price_tree(&reference_call(), steps).unwrap().price - bs).abs();
        assert!(err <= prev_err + 1e-3, "steps={steps} err={err} prev={prev_err}");
        prev_err = err;
    }
    assert!(prev_err / bs < 1e-2);
    assert!(prev_err < 5e-3);
}

#[test]
fn reference_scenario_prices() {
    let tree = price_tree(&reference_call(), 500).unwrap();
    assert!((tree.price - 10.45).abs() < 1e-2, "tree={}", tree.price);
    assert!(tree.stderr.is_none());

    let mc = price_monte_carlo(&reference_call(), 100_000, 50, 42).unwrap();
    assert!((mc.price - 10.45).abs() < 0.1, "mc={}", mc.price);
    let half_width = mc.half_width(0.95).unwrap();
    assert_relative_eq!(half_width, 1.959_963_984_540_054 * mc.stderr.unwrap(), max_relative = 1e-9);
    assert!(half_width > 0.0 && half_width < 0.2);
}

#[test]
fn put_call_parity_holds_for_both_engines() {
    let (s, k, t, r, q) = (100.0, 95.0, 0.75, 0.04, 0.02);
    let build = |option_type| {
        PricingRequest::new(s, k, t, 0.25, r, q, option_type, ExerciseStyle::European).unwrap()
    };
    let forward_gap = s * (-q * t).exp() - k * (-r * t).exp();

    let tree = BinomialTreeEngine::new(400);
    let tree_gap = tree.price(&build(OptionType::Call)).unwrap().price
        - tree.price(&build(OptionType::Put)).unwrap().price;
    assert_relative_eq!(tree_gap, forward_gap, epsilon = 1e-8);

    let mc = LongstaffSchwartzEngine::new(50_000, 10, 7).with_antithetic(true);
    let mc_gap = mc.price(&build(OptionType::Call)).unwrap().price
        - mc.price(&build(OptionType::Put)).unwrap().price;
    assert!((mc_gap - forward_gap).abs() < 0.1, "mc_gap={mc_gap} forward_gap={forward_gap}");
}

#[test]
fn american_is_worth_at_least_european() {
    for option_type in [OptionType::Call, OptionType::Put] {
        for spot in [80.0, 100.0, 120.0] {
            let eu = price_tree(&request(spot, 0.3, option_type, ExerciseStyle::European), 300)
                .unwrap()
                .price;
            let am = price_tree(&request(spot, 0.3, option_type, ExerciseStyle::American), 300)
                .unwrap()
                .price;
            assert!(am >= eu - 1e-12, "{option_type:?} S={spot} am={am} eu={eu}");
        }
    }
}

#[test]
fn prices_are_monotone_in_spot_and_volatility() {
    let tree = BinomialTreeEngine::new(300);
    let spots = [80.0, 90.0, 100.0, 110.0, 120.0];

    for exercise in [ExerciseStyle::European, ExerciseStyle::American] {
        let calls: Vec<f64> = spots
            .iter()
            .map(|&s| tree.price(&request(s, 0.2, OptionType::Call, exercise)).unwrap().price)
            .collect();
        let puts: Vec<f64> = spots
            .iter()
            .map(|&s| tree.price(&request(s, 0.2, OptionType::Put, exercise)).unwrap().price)
            .collect();
        assert!(calls.windows(2).all(|w| w[1] >= w[0]), "{calls:?}");
        assert!(puts.windows(2).all(|w| w[1] <= w[0]), "{puts:?}");

        let by_vol: Vec<f64> = [0.1, 0.2, 0.3, 0.4]
            .iter()
            .map(|&v| tree.price(&request(100.0, v, OptionType::Call, exercise)).unwrap().price)
            .collect();
        assert!(by_vol.windows(2).all(|w| w[1] > w[0]), "{by_vol:?}");
    }
}

#[test]
fn zero_maturity_is_exact_intrinsic_for_both_engines() {
    for (option_type, spot, expected) in [
        (OptionType::Call, 130.0, 30.0),
        (OptionType::Put, 130.0, 0.0),
        (OptionType::Put, 75.0, 25.0),
    ] {
        for exercise in [ExerciseStyle::European, ExerciseStyle::American] {
            let req = request(spot, 0.2, option_type, exercise)
                .with_time_to_maturity(0.0)
                .unwrap();
            assert_eq!(price_tree(&req, 500).unwrap().price, expected);
            let mc = price_monte_carlo(&req, 1_000, 10, 1).unwrap();
            assert_eq!(mc.price, expected);
            assert_eq!(mc.stderr, Some(0.0));
        }
    }
}

#[test]
fn monte_carlo_is_reproducible_and_seed_sensitive() {
    let req = request(100.0, 0.2, OptionType::Put, ExerciseStyle::American);
    let a = price_monte_carlo(&req, 20_000, 25, 42).unwrap();
    let b = price_monte_carlo(&req, 20_000, 25, 42).unwrap();
    let c = price_monte_carlo(&req, 20_000, 25, 43).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.price, c.price);
}

#[test]
fn engines_are_shareable_across_threads() {
    let engine = LongstaffSchwartzEngine::new(5_000, 20, 9);
    let req = request(100.0, 0.25, OptionType::Put, ExerciseStyle::American);
    let serial = engine.price(&req).unwrap().price;

    let prices: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.price(&req).unwrap().price))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(prices.iter().all(|&p| p == serial));
}

#[test]
fn tree_and_monte_carlo_agree_on_american_put() {
    let req = request(90.0, 0.3, OptionType::Put, ExerciseStyle::American);
    let tree = price_tree(&req, 1000).unwrap().price;
    let mc = price_monte_carlo(&req, 100_000, 50, 42).unwrap();
    assert!(
        (mc.price - tree).abs() < 0.15,
        "tree={tree:.4} mc={:.4} stderr={:.4}",
        mc.price,
        mc.stderr.unwrap()
    );
}

#[test]
fn error_taxonomy() {
    assert!(matches!(
        PricingRequest::new(-1.0, 100.0, 1.0, 0.2, 0.05, 0.0, OptionType::Call, ExerciseStyle::European),
        Err(PricingError::InvalidInput(_))
    ));
    assert!(matches!(
        PricingRequest::new(100.0, 100.0, -0.5, 0.2, 0.05, 0.0, OptionType::Call, ExerciseStyle::European),
        Err(PricingError::InvalidInput(_))
    ));
    assert!(matches!(
        PricingRequest::new(100.0, 100.0, 1.0, -0.2, 0.05, 0.0, OptionType::Call, ExerciseStyle::European),
        Err(PricingError::InvalidInput(_))
    ));
    assert!(matches!(
        price_tree(&reference_call(), 0),
        Err(PricingError::InvalidParameter(_))
    ));
    assert!(matches!(
        price_monte_carlo(&reference_call(), 0, 10, 1),
        Err(PricingError::InvalidParameter(_))
    ));
    assert!(matches!(
        price_monte_carlo(&reference_call(), 10, 0, 1),
        Err(PricingError::InvalidParameter(_))
    ));
}
