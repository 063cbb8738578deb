use serde::Serialize;
use tracing::{debug, info};

use super::domain::{Candidate, CandidateId, TransactionContext};
use super::features::{normalize, FeatureVector};
use super::penalty::{penalty, MerchantPenalty};
use super::preference::{weight, PreferenceWeight};
use super::scoring::{evaluate, top_drivers, Attribution, Calibrator, ScoreResult};
use super::weights::{ConfigIdentity, WeightConfig};
use super::DecisionError;

/// Ranked entry for one candidate card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeResult {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub p_approval: f64,
    pub expected_rewards: f64,
    pub preference_weight: f64,
    pub merchant_penalty: f64,
    pub utility: f64,
    pub top_drivers: Vec<Attribution>,
    pub audit: DecisionAudit,
}

/// Every intermediate value behind a ranking entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionAudit {
    pub config: ConfigIdentity,
    pub calibration: Calibrator,
    pub raw_score: f64,
    pub attributions: Vec<Attribution>,
    pub features: FeatureVector,
    pub rewards: RewardBreakdown,
    pub preference: PreferenceWeight,
    pub penalty: MerchantPenalty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub base_reward_rate: f64,
    pub category_mcc: String,
    pub category_multiplier: f64,
    pub expected_rewards: f64,
    pub cart_amount: f64,
    /// Expected rewards earned on this cart, in cart currency.
    pub reward_value: f64,
}

/// Expected reward rate for the cart. Unusable catalog rates earn nothing and unusable
/// multipliers are treated as neutral.
pub fn expected_rewards(candidate: &Candidate, features: &FeatureVector) -> RewardBreakdown {
    let base_reward_rate = if candidate.base_reward_rate.is_finite() && candidate.base_reward_rate >= 0.0 {
        candidate.base_reward_rate
    } else {
        0.0
    };
    let multiplier = candidate.category_multiplier(&features.cart_mcc);
    let category_multiplier = if multiplier.is_finite() && multiplier >= 0.0 {
        multiplier
    } else {
        1.0
    };
    let expected_rewards = base_reward_rate * category_multiplier;

    RewardBreakdown {
        base_reward_rate,
        category_mcc: features.cart_mcc.clone(),
        category_multiplier,
        expected_rewards,
        cart_amount: features.amount,
        reward_value: features.amount * expected_rewards,
    }
}

pub fn rank(
    context: &TransactionContext,
    candidates: &[Candidate],
    config: &WeightConfig,
) -> Result<Vec<CompositeResult>, DecisionError> {
    let base = normalize(context)?;
    // normalize() has already rejected a context without a merchant.
    let Some(merchant) = context.merchant.as_ref() else {
        return Err(DecisionError::invalid_context("merchant is missing"));
    };

    let mut ranked: Vec<CompositeResult> = candidates
        .iter()
        .map(|candidate| {
            let ScoreResult {
                raw_score,
                p_approval,
                attributions,
                features,
                ..
            } = evaluate(base.for_candidate(candidate), config);

            let rewards = expected_rewards(candidate, &features);
            let preference = weight(&context.customer, candidate, &features, &config.preference);
            let penalty = penalty(merchant, candidate, &config.penalty);
            let utility = p_approval * rewards.expected_rewards * preference.weight * penalty.penalty;

            debug!(
                candidate = %candidate.id,
                raw_score,
                p_approval,
                expected_rewards = rewards.expected_rewards,
                preference_weight = preference.weight,
                merchant_penalty = penalty.penalty,
                utility,
                "scored candidate"
            );

            CompositeResult {
                candidate_id: candidate.id.clone(),
                candidate_name: candidate.name.clone(),
                p_approval,
                expected_rewards: rewards.expected_rewards,
                preference_weight: preference.weight,
                merchant_penalty: penalty.penalty,
                utility,
                top_drivers: top_drivers(&attributions, config.explain.top_drivers),
                audit: DecisionAudit {
                    config: config.identity.clone(),
                    calibration: config.calibrator.clone(),
                    raw_score,
                    attributions,
                    features,
                    rewards,
                    preference,
                    penalty,
                },
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.utility
            .total_cmp(&a.utility)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });

    info!(
        config_version = %config.identity.version,
        candidates = ranked.len(),
        top = ranked.first().map(|result| result.candidate_id.0.as_str()).unwrap_or("none"),
        "ranked checkout candidates"
    );

    Ok(ranked)
}
