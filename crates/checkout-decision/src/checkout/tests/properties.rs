use proptest::prelude::*;
use proptest::sample::select;

use super::common::*;
use crate::checkout::domain::Cart;
use crate::checkout::{decide, explain};

const MCCS: &[&str] = &["4829", "4900", "5411", "5541", "5732", "5812", "5967", "7995", "9999"];
const TIERS: &[&str] = &["NONE", "SILVER", "GOLD", "PLATINUM", "unknown"];
const ISSUERS: &[&str] = &["visa", "mastercard", "amex", "discover", "unionpay"];

fn scenario(
    amount: f64,
    mcc: &str,
    tier: &str,
    issuer: &str,
    velocity_24h: u32,
    chargebacks: u32,
) -> crate::checkout::TransactionContext {
    let mut context = grocery_context();
    context.cart = Some(Cart {
        items: vec![item(amount, 1.0, mcc)],
        currency: None,
    });
    context.merchant = Some(merchant("Test Merchant", mcc));
    context.customer.loyalty_tier = Some(tier.to_string());
    context.customer.velocity_24h = Some(velocity_24h);
    context.customer.chargebacks_12m = Some(chargebacks);
    context.card_issuer = Some(issuer.to_string());
    context
}

proptest! {
    #[test]
    fn attributions_always_sum_to_raw_score(
        amount in 0.0f64..20_000.0,
        mcc in select(MCCS),
        tier in select(TIERS),
        issuer in select(ISSUERS),
        velocity in 0u32..40,
        chargebacks in 0u32..6,
    ) {
        let context = scenario(amount, mcc, tier, issuer, velocity, chargebacks);
        let result = explain(&context, &config()).expect("valid context");
        let total: f64 = result.attributions.iter().map(|a| a.contribution).sum();
        prop_assert!((total - result.raw_score).abs() < 1e-9);
    }

    #[test]
    fn approval_probability_stays_within_bounds(
        amount in 0.0f64..1_000_000.0,
        mcc in select(MCCS),
        tier in select(TIERS),
        velocity in 0u32..1_000,
        chargebacks in 0u32..100,
    ) {
        let context = scenario(amount, mcc, tier, "visa", velocity, chargebacks);
        let result = explain(&context, &config()).expect("valid context");
        prop_assert!(result.p_approval >= 0.01 && result.p_approval <= 0.99);
    }

    #[test]
    fn calibration_is_monotone(a in -50.0f64..50.0, b in -50.0f64..50.0) {
        let calibrator = config().calibrator;
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(calibrator.calibrate(low) <= calibrator.calibrate(high));
    }

    #[test]
    fn ranking_factors_respect_their_ranges(
        amount in 0.0f64..10_000.0,
        mcc in select(MCCS),
        tier in select(TIERS),
    ) {
        let context = scenario(amount, mcc, tier, "visa", 0, 0);
        let ranked = decide(&context, &wallet(), &config()).expect("valid context");
        prop_assert_eq!(ranked.len(), wallet().len());
        for result in &ranked {
            prop_assert!(result.preference_weight >= 0.5 && result.preference_weight <= 1.5);
            prop_assert!(result.merchant_penalty > 0.0 && result.merchant_penalty <= 1.0);
            prop_assert!(result.utility >= 0.0);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].utility >= pair[1].utility);
        }
    }
}
