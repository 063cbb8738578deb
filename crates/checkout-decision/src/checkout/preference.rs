use serde::Serialize;

use super::domain::{Candidate, CustomerProfile};
use super::features::{FeatureVector, LoyaltyTier};
use super::weights::PreferenceSettings;

/// Multiplier reflecting how much the customer favours a candidate, with its inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceWeight {
    pub weight: f64,
    pub loyalty_tier: LoyaltyTier,
    pub loyalty_multiplier: f64,
    /// Which customer list produced the affinity bonus, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity_signal: Option<AffinitySignal>,
    pub affinity_multiplier: f64,
    pub category_multiplier: f64,
    /// Product before the configured bounds were applied.
    pub unclamped: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AffinitySignal {
    PreferredCard,
    PreferredIssuer,
    HistoricalIssuer,
    LoyaltyProgram,
}

pub fn weight(
    customer: &CustomerProfile,
    candidate: &Candidate,
    features: &FeatureVector,
    settings: &PreferenceSettings,
) -> PreferenceWeight {
    let loyalty_multiplier = settings.loyalty_multiplier(features.loyalty_tier);

    let affinity_signal = affinity_signal(customer, candidate);
    let affinity_multiplier = if affinity_signal.is_some() {
        settings.issuer_affinity_bonus
    } else {
        1.0
    };

    let category_multiplier = if candidate.category_bonuses.contains_key(&features.cart_mcc) {
        settings.category_boost
    } else {
        1.0
    };

    let unclamped = loyalty_multiplier * affinity_multiplier * category_multiplier;

    PreferenceWeight {
        weight: unclamped.clamp(settings.min_weight, settings.max_weight),
        loyalty_tier: features.loyalty_tier,
        loyalty_multiplier,
        affinity_signal,
        affinity_multiplier,
        category_multiplier,
        unclamped,
    }
}

fn affinity_signal(customer: &CustomerProfile, candidate: &Candidate) -> Option<AffinitySignal> {
    let listed = |values: &[String], needle: &str| {
        values
            .iter()
            .any(|value| value.trim().eq_ignore_ascii_case(needle.trim()))
    };

    if listed(&customer.preferred_cards, &candidate.id.0) {
        return Some(AffinitySignal::PreferredCard);
    }
    if listed(&customer.preferred_issuers, &candidate.issuer) {
        return Some(AffinitySignal::PreferredIssuer);
    }
    if listed(&customer.historical_issuers, &candidate.issuer) {
        return Some(AffinitySignal::HistoricalIssuer);
    }
    match &candidate.loyalty_program {
        Some(program) if listed(&customer.loyalty_programs, program) => {
            Some(AffinitySignal::LoyaltyProgram)
        }
        _ => None,
    }
}
