use super::common::*;
use crate::checkout::features::{normalize, LoyaltyTier};
use crate::checkout::preference::{weight, AffinitySignal};
use crate::checkout::weights::PreferenceSettings;

fn settings() -> PreferenceSettings {
    config().preference
}

#[test]
fn customer_without_signals_is_neutral() {
    let mut context = grocery_context();
    context.customer.loyalty_tier = None;
    let features = normalize(&context).expect("valid context");

    let result = weight(
        &context.customer,
        &card("mastercard-cash", "mastercard", 0.02),
        &features,
        &settings(),
    );
    assert_eq!(result.loyalty_tier, LoyaltyTier::None);
    assert_eq!(result.weight, 1.0);
    assert!(result.affinity_signal.is_none());
}

#[test]
fn loyalty_affinity_and_category_multiply() {
    let mut context = grocery_context();
    context.customer.preferred_issuers = vec!["Visa".to_string()];
    let features = normalize(&context).expect("valid context");
    let candidate = with_bonus(card("visa-grocer", "visa", 0.015), "5411", 2.0);

    let result = weight(&context.customer, &candidate, &features, &settings());
    assert_eq!(result.affinity_signal, Some(AffinitySignal::PreferredIssuer));
    assert_eq!(result.loyalty_multiplier, 1.05);
    assert_eq!(result.category_multiplier, 1.15);
    assert!((result.weight - 1.05 * 1.10 * 1.15).abs() < 1e-12);
}

#[test]
fn preferred_card_outranks_other_signals() {
    let mut context = grocery_context();
    context.customer.preferred_cards = vec!["amex-gold".to_string()];
    context.customer.historical_issuers = vec!["amex".to_string()];
    let features = normalize(&context).expect("valid context");

    let result = weight(
        &context.customer,
        &card("amex-gold", "amex", 0.01),
        &features,
        &settings(),
    );
    assert_eq!(result.affinity_signal, Some(AffinitySignal::PreferredCard));
    assert_eq!(result.affinity_multiplier, 1.10);
}

#[test]
fn loyalty_program_membership_counts_as_affinity() {
    let mut context = grocery_context();
    context.customer.loyalty_programs = vec!["membership-rewards".to_string()];
    let features = normalize(&context).expect("valid context");
    let mut candidate = card("amex-gold", "amex", 0.01);
    candidate.loyalty_program = Some("Membership-Rewards".to_string());

    let result = weight(&context.customer, &candidate, &features, &settings());
    assert_eq!(result.affinity_signal, Some(AffinitySignal::LoyaltyProgram));
}

#[test]
fn weight_is_clamped_to_configured_bounds() {
    let mut context = grocery_context();
    context.customer.loyalty_tier = Some("platinum".to_string());
    context.customer.preferred_issuers = vec!["visa".to_string()];
    let features = normalize(&context).expect("valid context");
    let candidate = with_bonus(card("visa-grocer", "visa", 0.015), "5411", 2.0);

    let tight = PreferenceSettings {
        max_weight: 1.2,
        ..settings()
    };
    let result = weight(&context.customer, &candidate, &features, &tight);
    assert_eq!(result.weight, 1.2);
    assert!((result.unclamped - 1.15 * 1.10 * 1.15).abs() < 1e-12);
}

#[test]
fn unknown_tiers_are_treated_as_none() {
    let mut context = grocery_context();
    context.customer.loyalty_tier = Some("DIAMOND".to_string());
    let features = normalize(&context).expect("valid context");

    let result = weight(
        &context.customer,
        &card("discover-it", "discover", 0.01),
        &features,
        &settings(),
    );
    assert_eq!(result.loyalty_tier, LoyaltyTier::None);
    assert_eq!(result.loyalty_multiplier, 1.0);
}
