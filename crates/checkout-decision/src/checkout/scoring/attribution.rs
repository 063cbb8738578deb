use serde::{Deserialize, Serialize};

use super::super::features::{FeatureKind, FeatureValue};
use super::rules::FeatureContribution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    fn of(contribution: f64) -> Self {
        if contribution > 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

/// Explainable share of the raw score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub feature: FeatureKind,
    pub value: FeatureValue,
    pub contribution: f64,
    pub direction: Direction,
    pub source: String,
}

/// Re-exposes the scorer's own decomposition ordered by absolute contribution. Every entry is
/// kept, including zeros, so the contributions sum back to the raw score.
pub fn attribute(per_feature: &[FeatureContribution]) -> Vec<Attribution> {
    let mut attributions: Vec<Attribution> = per_feature
        .iter()
        .map(|entry| Attribution {
            feature: entry.feature,
            value: entry.value.clone(),
            contribution: entry.contribution,
            direction: Direction::of(entry.contribution),
            source: entry.source.clone(),
        })
        .collect();

    attributions.sort_by(|a, b| {
        b.contribution
            .abs()
            .total_cmp(&a.contribution.abs())
            .then(a.feature.cmp(&b.feature))
    });
    attributions
}

/// Non-zero attributions, strongest first, capped at `limit`.
pub fn top_drivers(attributions: &[Attribution], limit: usize) -> Vec<Attribution> {
    attributions
        .iter()
        .filter(|attribution| attribution.contribution != 0.0)
        .take(limit)
        .cloned()
        .collect()
}
