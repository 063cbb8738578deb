use super::common::*;
use crate::checkout::ranking::expected_rewards;
use crate::checkout::weights::WeightConfig;
use crate::checkout::{decide, normalize, DecisionEngine, DecisionError, RuleOrigin};

#[test]
fn ranks_wallet_by_composite_utility() {
    let ranked = decide(&grocery_context(), &wallet(), &config()).expect("valid context");

    let order: Vec<&str> = ranked
        .iter()
        .map(|result| result.candidate_id.0.as_str())
        .collect();
    assert_eq!(
        order,
        vec!["amex-gold", "visa-grocer", "mastercard-cash", "discover-it"]
    );

    for pair in ranked.windows(2) {
        assert!(pair[0].utility >= pair[1].utility);
    }
}

#[test]
fn utility_is_product_of_its_factors() {
    let ranked = decide(&grocery_context(), &wallet(), &config()).expect("valid context");

    for result in &ranked {
        let product = result.p_approval
            * result.expected_rewards
            * result.preference_weight
            * result.merchant_penalty;
        assert!((result.utility - product).abs() < 1e-12);
        assert!(result.utility >= 0.0);
    }
}

#[test]
fn each_candidate_is_scored_with_its_own_issuer() {
    let ranked = decide(&grocery_context(), &wallet(), &config()).expect("valid context");
    let amex = ranked
        .iter()
        .find(|result| result.candidate_id.0 == "amex-gold")
        .expect("amex ranked");

    assert_eq!(amex.audit.features.issuer_family, "amex");
    assert!((amex.audit.raw_score - 1.5).abs() < 1e-9);
    assert!(amex.top_drivers.len() <= config().explain.top_drivers);
}

#[test]
fn audit_records_every_intermediate_value() {
    let ranked = decide(&grocery_context(), &wallet(), &config()).expect("valid context");
    let amex = &ranked[0];

    assert_eq!(amex.audit.config.version, "1.0.0");
    assert_eq!(amex.audit.rewards.category_mcc, "5411");
    assert_eq!(amex.audit.rewards.category_multiplier, 4.0);
    assert!((amex.expected_rewards - 0.04).abs() < 1e-12);
    assert!((amex.audit.rewards.reward_value - 45.99 * 0.04).abs() < 1e-9);
    assert_eq!(amex.audit.preference.category_multiplier, 1.15);

    let rule = amex.audit.penalty.rule.as_ref().expect("whole foods rule consulted");
    assert_eq!(rule.origin, RuleOrigin::MerchantName);
    assert_eq!(rule.label, "Whole Foods Market");
    assert!(rule.applied);
    assert_eq!(amex.merchant_penalty, 0.9);
}

#[test]
fn equal_utility_orders_by_candidate_id() {
    let candidates = vec![
        card("zeta-card", "visa", 0.01),
        card("alpha-card", "visa", 0.01),
        card("mid-card", "visa", 0.01),
    ];

    let ranked = decide(&grocery_context(), &candidates, &config()).expect("valid context");
    let order: Vec<&str> = ranked
        .iter()
        .map(|result| result.candidate_id.0.as_str())
        .collect();
    assert_eq!(order, vec!["alpha-card", "mid-card", "zeta-card"]);
}

#[test]
fn no_candidates_yields_empty_ranking() {
    let ranked = decide(&grocery_context(), &[], &config()).expect("valid context");
    assert!(ranked.is_empty());
}

#[test]
fn invalid_context_fails_the_whole_decision() {
    let mut context = grocery_context();
    context.merchant = None;
    assert!(matches!(
        decide(&context, &wallet(), &config()),
        Err(DecisionError::InvalidContext { .. })
    ));
}

#[test]
fn unusable_reward_rates_earn_nothing() {
    let features = normalize(&grocery_context()).expect("valid context");

    let mut broken = card("broken", "visa", f64::NAN);
    broken.category_bonuses.insert("5411".to_string(), f64::INFINITY);
    let rewards = expected_rewards(&broken, &features);
    assert_eq!(rewards.base_reward_rate, 0.0);
    assert_eq!(rewards.category_multiplier, 1.0);
    assert_eq!(rewards.expected_rewards, 0.0);

    let negative = card("negative", "visa", -0.02);
    assert_eq!(expected_rewards(&negative, &features).expected_rewards, 0.0);
}

#[test]
fn repeated_decisions_are_identical() {
    let config = config();
    let context = grocery_context();
    let candidates = wallet();
    let baseline = decide(&context, &candidates, &config).expect("valid context");

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| decide(&context, &candidates, &config)))
            .collect();
        for handle in handles {
            let ranked = handle
                .join()
                .expect("decision thread panicked")
                .expect("valid context");
            assert_eq!(ranked, baseline);
        }
    });
}

#[test]
fn engine_scores_against_published_snapshot() {
    let engine = DecisionEngine::default();
    let before = engine
        .decide(&grocery_context(), &wallet())
        .expect("valid context");
    assert_eq!(before[0].audit.config.version, "1.0.0");

    let next = WeightConfig::from_json_str(
        r#"{ "version": "2.0.0", "penalty": { "merchant_rules": {}, "mcc_rules": {} } }"#,
    )
    .expect("valid document");
    let previous = engine.publish(next);
    assert_eq!(previous.version(), "1.0.0");

    let after = engine
        .decide(&grocery_context(), &wallet())
        .expect("valid context");
    assert_eq!(after[0].audit.config.version, "2.0.0");
    assert!(after.iter().all(|result| result.merchant_penalty == 1.0));

    let explained = engine.explain(&grocery_context()).expect("valid context");
    assert_eq!(explained.config.version, "2.0.0");
}
