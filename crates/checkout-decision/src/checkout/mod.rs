//! Checkout decision engine.
//!
//! Turns a transaction context into a calibrated approval probability per candidate card, a
//! composite utility ranking of those cards, and an additive explanation of every score. The
//! pipeline runs strictly forward: features, rules score, calibration and attribution, then
//! per card preference weight and merchant penalty, then ranking. Every stage is a pure
//! function of its inputs and one configuration snapshot.

pub mod catalog;
pub mod domain;
pub mod features;
pub mod matching;
pub mod penalty;
pub mod preference;
pub mod ranking;
pub mod scoring;
pub mod snapshot;
pub mod weights;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use catalog::{CardCatalog, CatalogError};
pub use domain::{
    Candidate, CandidateId, CardType, Cart, CartItem, CustomerProfile, DeviceSnapshot,
    GeoSnapshot, Location, MerchantProfile, NumericInput, TransactionContext,
};
pub use features::{
    normalize, FeatureKind, FeatureValue, FeatureVector, LoyaltyTier, MerchantRiskTier,
};
pub use penalty::{MerchantPenalty, RuleApplication, RuleOrigin};
pub use preference::{AffinitySignal, PreferenceWeight};
pub use ranking::{CompositeResult, DecisionAudit, RewardBreakdown};
pub use scoring::{Attribution, CalibrationMethod, Direction, ScoreResult};
pub use snapshot::ConfigHandle;
pub use weights::{ConfigIdentity, WeightConfig, WeightConfigDocument};

/// Failures surfaced by the engine. Everything else resolves to documented defaults.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecisionError {
    #[error("invalid transaction context: {reason}")]
    InvalidContext { reason: String },
    #[error("unsupported calibration method '{method}'")]
    CalibrationMethod { method: String },
    #[error("invalid weight configuration: {reason}")]
    ConfigValidation { reason: String },
}

impl DecisionError {
    pub(crate) fn invalid_context(reason: impl Into<String>) -> Self {
        Self::InvalidContext {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            reason: reason.into(),
        }
    }
}

/// Ranks `candidates` for `context`. Either every candidate is scored or an error is returned.
pub fn decide(
    context: &TransactionContext,
    candidates: &[Candidate],
    config: &WeightConfig,
) -> Result<Vec<CompositeResult>, DecisionError> {
    ranking::rank(context, candidates, config)
}

/// Scores the context without ranking cards; the issuer comes from the context hint.
pub fn explain(
    context: &TransactionContext,
    config: &WeightConfig,
) -> Result<ScoreResult, DecisionError> {
    let features = normalize(context)?;
    Ok(scoring::evaluate(features, config))
}

/// Engine bound to a swappable configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: ConfigHandle,
}

impl DecisionEngine {
    pub fn new(config: ConfigHandle) -> Self {
        Self { config }
    }

    pub fn decide(
        &self,
        context: &TransactionContext,
        candidates: &[Candidate],
    ) -> Result<Vec<CompositeResult>, DecisionError> {
        let snapshot = self.config.snapshot();
        decide(context, candidates, &snapshot)
    }

    pub fn explain(&self, context: &TransactionContext) -> Result<ScoreResult, DecisionError> {
        let snapshot = self.config.snapshot();
        explain(context, &snapshot)
    }

    pub fn publish(&self, config: WeightConfig) -> Arc<WeightConfig> {
        self.config.publish(config)
    }

    pub fn snapshot(&self) -> Arc<WeightConfig> {
        self.config.snapshot()
    }
}
