use std::collections::BTreeMap;

use crate::checkout::domain::{
    Candidate, CandidateId, CardType, Cart, CartItem, CustomerProfile, MerchantProfile,
    NumericInput, TransactionContext,
};
use crate::checkout::weights::WeightConfig;

pub fn config() -> WeightConfig {
    WeightConfig::default()
}

pub fn item(unit_price: f64, quantity: f64, mcc: &str) -> CartItem {
    CartItem {
        unit_price: NumericInput::from(unit_price),
        quantity: NumericInput::from(quantity),
        mcc: Some(mcc.to_string()),
    }
}

pub fn merchant(name: &str, mcc: &str) -> MerchantProfile {
    MerchantProfile {
        name: name.to_string(),
        mcc: Some(mcc.to_string()),
        ..MerchantProfile::default()
    }
}

/// 45.99 grocery basket at a supermarket, SILVER customer, three purchases today, visa card.
pub fn grocery_context() -> TransactionContext {
    TransactionContext {
        cart: Some(Cart {
            items: vec![item(45.99, 1.0, "5411")],
            currency: Some("USD".to_string()),
        }),
        merchant: Some(merchant("Whole Foods", "5411")),
        customer: CustomerProfile {
            id: Some("cust-001".to_string()),
            loyalty_tier: Some("SILVER".to_string()),
            velocity_24h: Some(3),
            ..CustomerProfile::default()
        },
        card_issuer: Some("visa".to_string()),
        ..TransactionContext::default()
    }
}

/// 6000 spent at a gambling merchant by a customer with no history.
pub fn gambling_context() -> TransactionContext {
    TransactionContext {
        cart: Some(Cart {
            items: vec![item(6000.0, 1.0, "7995")],
            currency: Some("USD".to_string()),
        }),
        merchant: Some(merchant("Lucky Star Casino", "7995")),
        ..TransactionContext::default()
    }
}

pub fn card(id: &str, network: &str, base_reward_rate: f64) -> Candidate {
    Candidate {
        id: CandidateId(id.to_string()),
        name: id.replace('-', " "),
        issuer: network.to_string(),
        network: network.to_string(),
        card_type: CardType::Credit,
        base_reward_rate,
        category_bonuses: BTreeMap::new(),
        loyalty_program: None,
    }
}

pub fn with_bonus(mut candidate: Candidate, mcc: &str, multiplier: f64) -> Candidate {
    candidate.category_bonuses.insert(mcc.to_string(), multiplier);
    candidate
}

pub fn wallet() -> Vec<Candidate> {
    vec![
        with_bonus(card("visa-grocer", "visa", 0.015), "5411", 2.0),
        card("mastercard-cash", "mastercard", 0.02),
        with_bonus(card("amex-gold", "amex", 0.01), "5411", 4.0),
        card("discover-it", "discover", 0.01),
    ]
}
