use serde::{Deserialize, Serialize};

use super::super::features::{FeatureKind, FeatureValue, FeatureVector};
use super::super::weights::WeightConfig;

/// Weight one feature contributed to the raw score and the config entry that supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: FeatureKind,
    pub value: FeatureValue,
    pub contribution: f64,
    pub source: String,
}

/// Raw log-odds score with its per-feature decomposition in canonical feature order.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleScore {
    pub raw_score: f64,
    pub per_feature: Vec<FeatureContribution>,
}

pub fn score(features: &FeatureVector, config: &WeightConfig) -> RuleScore {
    let per_feature: Vec<FeatureContribution> = FeatureKind::ALL
        .iter()
        .map(|kind| {
            let (contribution, source) = lookup(*kind, features, config);
            FeatureContribution {
                feature: *kind,
                value: features.value_of(*kind),
                contribution,
                source,
            }
        })
        .collect();

    let raw_score = per_feature.iter().map(|entry| entry.contribution).sum();

    RuleScore {
        raw_score,
        per_feature,
    }
}

fn lookup(kind: FeatureKind, features: &FeatureVector, config: &WeightConfig) -> (f64, String) {
    match kind {
        FeatureKind::Mcc => {
            let hit = config.mcc_weights.lookup(&features.mcc);
            (hit.weight, format!("mcc_weights:{}", hit.key))
        }
        FeatureKind::Amount => {
            let bucket = config.amount_weights.lookup(features.amount);
            (bucket.weight, format!("amount_weights{}", bucket.label()))
        }
        FeatureKind::IssuerFamily => {
            let hit = config.issuer_weights.lookup(&features.issuer_family);
            (hit.weight, format!("issuer_weights:{}", hit.key))
        }
        FeatureKind::CrossBorder => {
            let weights = config.cross_border_weights;
            if features.cross_border {
                (weights.cross_border, "cross_border_weights:cross_border".to_string())
            } else {
                (weights.domestic, "cross_border_weights:domestic".to_string())
            }
        }
        FeatureKind::LocationMismatch => {
            let bucket = config.location_weights.lookup(features.location_mismatch_km);
            (bucket.weight, format!("location_weights{}", bucket.label()))
        }
        FeatureKind::Velocity24h => {
            let bucket = config
                .velocity_24h_weights
                .lookup(f64::from(features.velocity_24h));
            (bucket.weight, format!("velocity_weights.24h{}", bucket.label()))
        }
        FeatureKind::Velocity7d => {
            let bucket = config
                .velocity_7d_weights
                .lookup(f64::from(features.velocity_7d));
            (bucket.weight, format!("velocity_weights.7d{}", bucket.label()))
        }
        FeatureKind::Chargebacks12m => {
            let bucket = config
                .chargeback_weights
                .lookup(f64::from(features.chargebacks_12m));
            (bucket.weight, format!("chargeback_weights{}", bucket.label()))
        }
        FeatureKind::MerchantRiskTier => {
            let hit = config
                .merchant_risk_weights
                .lookup(features.merchant_risk_tier.label());
            (hit.weight, format!("merchant_risk_weights:{}", hit.key))
        }
        FeatureKind::LoyaltyTier => {
            let hit = config.loyalty_weights.lookup(features.loyalty_tier.label());
            (hit.weight, format!("loyalty_weights:{}", hit.key))
        }
    }
}
