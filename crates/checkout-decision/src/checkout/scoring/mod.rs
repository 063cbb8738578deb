pub mod attribution;
pub mod calibration;
pub mod rules;

pub use attribution::{attribute, top_drivers, Attribution, Direction};
pub use calibration::{CalibrationMethod, Calibrator, ProbabilityBounds};
pub use rules::{score, FeatureContribution, RuleScore};

use serde::Serialize;

use super::features::FeatureVector;
use super::weights::{ConfigIdentity, WeightConfig};

/// Calibrated score for one feature vector with its full additive explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub raw_score: f64,
    pub p_approval: f64,
    pub attributions: Vec<Attribution>,
    pub calibration_method: CalibrationMethod,
    pub features: FeatureVector,
    pub config: ConfigIdentity,
}

impl ScoreResult {
    pub fn top_drivers(&self, limit: usize) -> Vec<Attribution> {
        top_drivers(&self.attributions, limit)
    }
}

/// Scores, calibrates and attributes one feature vector against a snapshot.
pub fn evaluate(features: FeatureVector, config: &WeightConfig) -> ScoreResult {
    let RuleScore {
        raw_score,
        per_feature,
    } = score(&features, config);

    ScoreResult {
        raw_score,
        p_approval: config.calibrator.calibrate(raw_score),
        attributions: attribute(&per_feature),
        calibration_method: config.calibrator.method(),
        features,
        config: config.identity.clone(),
    }
}
