use serde::Serialize;

use super::domain::{Candidate, MerchantProfile};
use super::matching::best_match;
use super::weights::{MerchantRule, PenaltySettings};

/// Multiplier in `(0, 1]` lowering utility when a card conflicts with merchant preferences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantPenalty {
    pub penalty: f64,
    pub network_mismatch: bool,
    pub network_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleApplication>,
    pub rule_factor: f64,
}

/// Merchant rule consulted for a candidate and whether it fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleApplication {
    pub origin: RuleOrigin,
    pub label: String,
    /// Similarity of the merchant name to the rule name for name-keyed rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrigin {
    MerchantName,
    Mcc,
}

/// Rule governing a merchant regardless of candidate: the best fuzzy name match, falling back
/// to the MCC rule.
/// A matched name rule suppresses the MCC fallback even when it does not cover the candidate.
pub fn merchant_rule<'a>(
    merchant: &MerchantProfile,
    settings: &'a PenaltySettings,
) -> Option<(RuleOrigin, &'a MerchantRule, Option<f64>)> {
    if let Some(found) = best_match(
        &merchant.name,
        &settings.merchant_rules,
        settings.fuzzy_threshold,
    ) {
        return Some((RuleOrigin::MerchantName, found.entry, Some(found.similarity)));
    }

    merchant
        .mcc
        .as_deref()
        .map(str::trim)
        .and_then(|mcc| settings.mcc_rules.get(mcc))
        .map(|rule| (RuleOrigin::Mcc, rule, None))
}

pub fn penalty(
    merchant: &MerchantProfile,
    candidate: &Candidate,
    settings: &PenaltySettings,
) -> MerchantPenalty {
    let network_mismatch = !merchant.preferred_networks.is_empty()
        && !merchant
            .preferred_networks
            .iter()
            .any(|network| network.trim().eq_ignore_ascii_case(candidate.network.trim()));
    let network_factor = if network_mismatch {
        settings.network_mismatch_factor
    } else {
        1.0
    };

    let (rule, rule_factor) = match merchant_rule(merchant, settings) {
        Some((origin, rule, similarity)) => {
            let applied = rule.applies_to(&candidate.network, candidate.card_type);
            let factor = if applied { rule.factor } else { 1.0 };
            let application = RuleApplication {
                origin,
                label: rule.label.clone(),
                similarity,
                applied,
            };
            (Some(application), factor)
        }
        None => (None, 1.0),
    };

    MerchantPenalty {
        penalty: network_factor * rule_factor,
        network_mismatch,
        network_factor,
        rule,
        rule_factor,
    }
}
