use super::common::*;
use crate::checkout::domain::CardType;
use crate::checkout::penalty::{merchant_rule, penalty, RuleOrigin};
use crate::checkout::weights::PenaltySettings;

fn settings() -> PenaltySettings {
    config().penalty
}

#[test]
fn name_variants_hit_the_same_rule() {
    let settings = settings();
    let amex = card("amex-gold", "amex", 0.01);

    for name in ["Whole Foods", "Whole Foods Market", "WHOLE FOODS MARKET #1021"] {
        let result = penalty(&merchant(name, "5411"), &amex, &settings);
        let rule = result.rule.as_ref().expect("rule matched");
        assert_eq!(rule.origin, RuleOrigin::MerchantName, "{name}");
        assert_eq!(rule.label, "Whole Foods Market", "{name}");
        assert!(rule.applied);
        assert_eq!(result.penalty, 0.9, "{name}");
    }
}

#[test]
fn unrelated_name_falls_back_to_mcc_rule() {
    let settings = settings();
    let shell = merchant("Shell Gas Station", "5541");

    let (origin, rule, similarity) = merchant_rule(&shell, &settings).expect("mcc rule exists");
    assert_eq!(origin, RuleOrigin::Mcc);
    assert_eq!(rule.label, "5541");
    assert!(similarity.is_none());

    let credit = penalty(&shell, &card("visa-credit", "visa", 0.01), &settings);
    assert_eq!(credit.rule_factor, 0.95);

    let mut debit_card = card("visa-debit", "visa", 0.01);
    debit_card.card_type = CardType::Debit;
    let debit = penalty(&shell, &debit_card, &settings);
    assert_eq!(debit.penalty, 1.0);
    assert!(!debit.rule.as_ref().expect("rule consulted").applied);
}

#[test]
fn name_rule_supersedes_mcc_rule() {
    let settings = settings();
    let costco_fuel = merchant("Costco Wholesale", "5541");

    let visa = penalty(&costco_fuel, &card("visa-credit", "visa", 0.01), &settings);
    let rule = visa.rule.as_ref().expect("name rule matched");
    assert_eq!(rule.origin, RuleOrigin::MerchantName);
    assert!(!rule.applied);
    assert_eq!(visa.penalty, 1.0);

    let amex = penalty(&costco_fuel, &card("amex-gold", "amex", 0.01), &settings);
    assert_eq!(amex.penalty, 0.5);
}

#[test]
fn network_mismatch_compounds_with_rules() {
    let settings = settings();
    let mut costco = merchant("Costco Wholesale", "5300");
    costco.preferred_networks = vec!["VISA".to_string()];

    let visa = penalty(&costco, &card("visa-credit", "visa", 0.01), &settings);
    assert!(!visa.network_mismatch);
    assert_eq!(visa.penalty, 1.0);

    let amex = penalty(&costco, &card("amex-gold", "amex", 0.01), &settings);
    assert!(amex.network_mismatch);
    assert_eq!(amex.network_factor, 0.85);
    assert!((amex.penalty - 0.85 * 0.5).abs() < 1e-12);
}

#[test]
fn merchants_without_rules_are_neutral() {
    let settings = settings();
    let result = penalty(
        &merchant("Neighborhood Bakery", "5462"),
        &card("mastercard-cash", "mastercard", 0.02),
        &settings,
    );
    assert!(result.rule.is_none());
    assert_eq!(result.penalty, 1.0);
}

#[test]
fn penalty_stays_within_unit_interval() {
    let settings = settings();
    let mut merchant = merchant("Costco", "4900");
    merchant.preferred_networks = vec!["visa".to_string()];

    for network in ["visa", "mastercard", "amex", "discover", "unionpay"] {
        let result = penalty(&merchant, &card("test-card", network, 0.01), &settings);
        assert!(result.penalty > 0.0 && result.penalty <= 1.0, "{network}");
    }
}
