//! Versioned weight configuration.
//!
//! `WeightConfigDocument` is the wire shape read from configuration storage: every block is
//! optional and unknown keys are ignored. `WeightConfig` is the validated, immutable snapshot
//! the engine scores against. Every table lookup on a `WeightConfig` is total: range tables
//! cover `[0, +inf)` without gaps and exact-match tables always carry a `default` weight.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::CardType;
use super::features::LoyaltyTier;
use super::matching::normalize_merchant_name;
use super::scoring::calibration::{CalibrationMethod, Calibrator, ProbabilityBounds};
use super::DecisionError;

pub const DEFAULT_KEY: &str = "default";
pub const UNVERSIONED: &str = "unversioned";
pub const BUILTIN_VERSION: &str = "1.0.0";

const DEFAULT_MCC_WEIGHTS: &[(&str, f64)] = &[
    ("4829", -1.2),
    ("4900", 0.2),
    ("5311", 0.2),
    ("5411", 0.6),
    ("5541", 0.2),
    ("5732", -0.3),
    ("5812", 0.3),
    ("5967", -1.0),
    ("6051", -1.0),
    ("7995", -2.5),
];
const DEFAULT_AMOUNT_BUCKETS: &[(f64, Option<f64>, f64)] = &[
    (0.0, Some(10.0), 0.4),
    (10.0, Some(50.0), 0.5),
    (50.0, Some(100.0), 0.3),
    (100.0, Some(500.0), 0.0),
    (500.0, Some(1000.0), -0.4),
    (1000.0, Some(5000.0), -0.9),
    (5000.0, None, -1.5),
];
const DEFAULT_ISSUER_WEIGHTS: &[(&str, f64)] = &[
    ("amex", 0.1),
    ("discover", 0.05),
    ("mastercard", 0.25),
    ("visa", 0.3),
];
const DEFAULT_LOCATION_BUCKETS: &[(f64, Option<f64>, f64)] = &[
    (0.0, Some(50.0), 0.0),
    (50.0, Some(500.0), -0.2),
    (500.0, Some(2000.0), -0.5),
    (2000.0, None, -0.9),
];
const DEFAULT_VELOCITY_24H_BUCKETS: &[(f64, Option<f64>, f64)] = &[
    (0.0, Some(5.0), 0.0),
    (5.0, Some(10.0), -0.4),
    (10.0, None, -1.0),
];
const DEFAULT_VELOCITY_7D_BUCKETS: &[(f64, Option<f64>, f64)] = &[
    (0.0, Some(20.0), 0.0),
    (20.0, Some(50.0), -0.3),
    (50.0, None, -0.8),
];
const DEFAULT_CHARGEBACK_BUCKETS: &[(f64, Option<f64>, f64)] = &[
    (0.0, Some(1.0), 0.0),
    (1.0, Some(3.0), -0.7),
    (3.0, None, -1.5),
];
const DEFAULT_MERCHANT_RISK_WEIGHTS: &[(&str, f64)] =
    &[("high", -0.8), ("low", 0.2), ("medium", -0.2)];
const DEFAULT_LOYALTY_WEIGHTS: &[(&str, f64)] = &[
    ("GOLD", 0.2),
    ("NONE", 0.0),
    ("PLATINUM", 0.3),
    ("SILVER", 0.1),
];
const DEFAULT_LOYALTY_MULTIPLIERS: &[(LoyaltyTier, f64)] = &[
    (LoyaltyTier::None, 1.0),
    (LoyaltyTier::Silver, 1.05),
    (LoyaltyTier::Gold, 1.10),
    (LoyaltyTier::Platinum, 1.15),
];

const DEFAULT_ISSUER_AFFINITY_BONUS: f64 = 1.10;
const DEFAULT_CATEGORY_BOOST: f64 = 1.15;
const DEFAULT_MIN_WEIGHT: f64 = 0.5;
const DEFAULT_MAX_WEIGHT: f64 = 1.5;
const DEFAULT_NETWORK_MISMATCH_FACTOR: f64 = 0.85;
const DEFAULT_FUZZY_THRESHOLD: f64 = 0.6;
const DEFAULT_TOP_DRIVERS: usize = 5;

/// One `[min, max)` bucket of a range table; `max = None` marks the open-ended last bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBucket {
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
    pub weight: f64,
}

impl RangeBucket {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value < max)
    }

    pub fn label(&self) -> String {
        match self.max {
            Some(max) => format!("[{},{})", self.min, max),
            None => format!("[{},+inf)", self.min),
        }
    }
}

/// Contiguous buckets covering `[0, +inf)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTable {
    buckets: Vec<RangeBucket>,
}

impl RangeTable {
    fn trusted(buckets: &[(f64, Option<f64>, f64)]) -> Self {
        Self {
            buckets: buckets
                .iter()
                .map(|&(min, max, weight)| RangeBucket { min, max, weight })
                .collect(),
        }
    }

    pub fn from_buckets(table: &str, buckets: Vec<RangeBucket>) -> Result<Self, DecisionError> {
        let Some(first) = buckets.first() else {
            return Err(DecisionError::config(format!("{table} has no buckets")));
        };
        if first.min != 0.0 {
            return Err(DecisionError::config(format!(
                "{table} must start at 0, found {}",
                first.min
            )));
        }

        let last_index = buckets.len() - 1;
        for (index, bucket) in buckets.iter().enumerate() {
            if !bucket.min.is_finite() || !bucket.weight.is_finite() {
                return Err(DecisionError::config(format!(
                    "{table} bucket {} has a non-finite bound or weight",
                    bucket.label()
                )));
            }
            match (bucket.max, index == last_index) {
                (Some(max), false) => {
                    if !max.is_finite() || max <= bucket.min {
                        return Err(DecisionError::config(format!(
                            "{table} bucket {} is empty or inverted",
                            bucket.label()
                        )));
                    }
                    let next = &buckets[index + 1];
                    if next.min != max {
                        return Err(DecisionError::config(format!(
                            "{table} buckets {} and {} are not contiguous",
                            bucket.label(),
                            next.label()
                        )));
                    }
                }
                (None, true) => {}
                (Some(_), true) => {
                    return Err(DecisionError::config(format!(
                        "{table} last bucket must be open-ended (omit max)"
                    )));
                }
                (None, false) => {
                    return Err(DecisionError::config(format!(
                        "{table} only the last bucket may be open-ended"
                    )));
                }
            }
        }

        Ok(Self { buckets })
    }

    /// Bucket holding `value`. Values below zero fall into the first bucket.
    pub fn lookup(&self, value: f64) -> &RangeBucket {
        let mut selected = None;
        for bucket in &self.buckets {
            selected = Some(bucket);
            if bucket.max.map_or(true, |max| value < max) {
                break;
            }
        }
        selected.unwrap_or(&FALLBACK_BUCKET)
    }

    pub fn buckets(&self) -> &[RangeBucket] {
        &self.buckets
    }
}

// Only reachable for a table built without buckets, which `from_buckets` rejects.
static FALLBACK_BUCKET: RangeBucket = RangeBucket {
    min: 0.0,
    max: None,
    weight: 0.0,
};

/// How a category table normalizes keys before storing or looking them up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    Exact,
    Lower,
    Upper,
}

impl KeyStyle {
    fn apply(self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            KeyStyle::Exact => trimmed.to_string(),
            KeyStyle::Lower => trimmed.to_ascii_lowercase(),
            KeyStyle::Upper => trimmed.to_ascii_uppercase(),
        }
    }
}

/// Exact-match weights with a mandatory fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    style: KeyStyle,
    default: f64,
    entries: BTreeMap<String, f64>,
}

/// Weight selected from a category table plus the key that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryHit {
    pub weight: f64,
    pub key: String,
}

impl CategoryTable {
    fn trusted(style: KeyStyle, default: f64, entries: &[(&str, f64)]) -> Self {
        Self {
            style,
            default,
            entries: entries
                .iter()
                .map(|&(key, weight)| (style.apply(key), weight))
                .collect(),
        }
    }

    pub fn from_map(
        table: &str,
        style: KeyStyle,
        raw: BTreeMap<String, f64>,
    ) -> Result<Self, DecisionError> {
        let mut default = None;
        let mut entries = BTreeMap::new();
        for (key, weight) in raw {
            if !weight.is_finite() {
                return Err(DecisionError::config(format!(
                    "{table} entry '{key}' has a non-finite weight"
                )));
            }
            if key.trim().eq_ignore_ascii_case(DEFAULT_KEY) {
                default = Some(weight);
                continue;
            }
            let normalized = style.apply(&key);
            if entries.insert(normalized.clone(), weight).is_some() {
                return Err(DecisionError::config(format!(
                    "{table} has duplicate entries for '{normalized}'"
                )));
            }
        }

        let default = default.ok_or_else(|| {
            DecisionError::config(format!("{table} is missing its '{DEFAULT_KEY}' entry"))
        })?;

        Ok(Self {
            style,
            default,
            entries,
        })
    }

    pub fn lookup(&self, key: &str) -> CategoryHit {
        let normalized = self.style.apply(key);
        match self.entries.get(&normalized) {
            Some(weight) => CategoryHit {
                weight: *weight,
                key: normalized,
            },
            None => CategoryHit {
                weight: self.default,
                key: DEFAULT_KEY.to_string(),
            },
        }
    }

    pub fn default_weight(&self) -> f64 {
        self.default
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossBorderWeights {
    pub domestic: f64,
    pub cross_border: f64,
}

impl Default for CrossBorderWeights {
    fn default() -> Self {
        Self {
            domestic: 0.0,
            cross_border: -0.6,
        }
    }
}

impl CrossBorderWeights {
    fn validate(self) -> Result<Self, DecisionError> {
        if self.domestic.is_finite() && self.cross_border.is_finite() {
            Ok(self)
        } else {
            Err(DecisionError::config("cross_border_weights must be finite"))
        }
    }
}

/// Multipliers applied by the preference weighter.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceSettings {
    pub loyalty_multipliers: BTreeMap<LoyaltyTier, f64>,
    pub issuer_affinity_bonus: f64,
    pub category_boost: f64,
    pub min_weight: f64,
    pub max_weight: f64,
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            loyalty_multipliers: DEFAULT_LOYALTY_MULTIPLIERS.iter().copied().collect(),
            issuer_affinity_bonus: DEFAULT_ISSUER_AFFINITY_BONUS,
            category_boost: DEFAULT_CATEGORY_BOOST,
            min_weight: DEFAULT_MIN_WEIGHT,
            max_weight: DEFAULT_MAX_WEIGHT,
        }
    }
}

impl PreferenceSettings {
    pub fn loyalty_multiplier(&self, tier: LoyaltyTier) -> f64 {
        self.loyalty_multipliers.get(&tier).copied().unwrap_or(1.0)
    }

    /// Tiers absent from `loyalty_multipliers` keep their built-in multiplier.
    fn from_document(document: PreferenceDocument) -> Result<Self, DecisionError> {
        let mut loyalty_multipliers = Self::default().loyalty_multipliers;
        for (raw, multiplier) in document.loyalty_multipliers.unwrap_or_default() {
            let tier = match raw.trim().to_ascii_uppercase().as_str() {
                "NONE" => LoyaltyTier::None,
                "SILVER" => LoyaltyTier::Silver,
                "GOLD" => LoyaltyTier::Gold,
                "PLATINUM" => LoyaltyTier::Platinum,
                _ => {
                    return Err(DecisionError::config(format!(
                        "preference.loyalty_multipliers has unknown tier '{raw}'"
                    )))
                }
            };
            positive_multiplier("preference.loyalty_multipliers", multiplier)?;
            loyalty_multipliers.insert(tier, multiplier);
        }
        if loyalty_multipliers
            .get(&LoyaltyTier::None)
            .is_some_and(|multiplier| *multiplier != 1.0)
        {
            return Err(DecisionError::config(
                "preference.loyalty_multipliers NONE must stay neutral (1.0)",
            ));
        }

        positive_multiplier("preference.issuer_affinity_bonus", document.issuer_affinity_bonus)?;
        positive_multiplier("preference.category_boost", document.category_boost)?;
        positive_multiplier("preference.min_weight", document.min_weight)?;
        positive_multiplier("preference.max_weight", document.max_weight)?;
        if document.min_weight > 1.0 || document.max_weight < 1.0 {
            return Err(DecisionError::config(
                "preference bounds must satisfy min_weight <= 1.0 <= max_weight",
            ));
        }

        Ok(Self {
            loyalty_multipliers,
            issuer_affinity_bonus: document.issuer_affinity_bonus,
            category_boost: document.category_boost,
            min_weight: document.min_weight,
            max_weight: document.max_weight,
        })
    }
}

/// Penalty rule attached to a merchant name or an MCC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantRule {
    /// Name or MCC exactly as configured, echoed in audits.
    pub label: String,
    pub networks: Vec<String>,
    pub card_types: Vec<CardType>,
    pub factor: f64,
}

impl MerchantRule {
    /// A rule without network or card-type filters applies to every card.
    pub fn applies_to(&self, network: &str, card_type: CardType) -> bool {
        if self.networks.is_empty() && self.card_types.is_empty() {
            return true;
        }
        self.networks
            .iter()
            .any(|listed| listed.eq_ignore_ascii_case(network.trim()))
            || self.card_types.contains(&card_type)
    }

    fn from_document(table: &str, label: String, document: RuleDocument) -> Result<Self, DecisionError> {
        penalty_factor(&format!("{table}['{label}'].factor"), document.factor)?;
        let card_types = document
            .card_types
            .iter()
            .map(|raw| {
                CardType::parse(raw).ok_or_else(|| {
                    DecisionError::config(format!("{table}['{label}'] has unknown card type '{raw}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            label,
            networks: document
                .networks
                .iter()
                .map(|network| network.trim().to_ascii_lowercase())
                .collect(),
            card_types,
            factor: document.factor,
        })
    }
}

/// Merchant penalty configuration. Name-keyed rules are stored under their normalized name.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltySettings {
    pub network_mismatch_factor: f64,
    pub fuzzy_threshold: f64,
    pub merchant_rules: BTreeMap<String, MerchantRule>,
    pub mcc_rules: BTreeMap<String, MerchantRule>,
}

impl Default for PenaltySettings {
    fn default() -> Self {
        let merchant_rules = [
            MerchantRule {
                label: "Costco Wholesale".to_string(),
                networks: vec![
                    "amex".to_string(),
                    "discover".to_string(),
                    "mastercard".to_string(),
                ],
                card_types: Vec::new(),
                factor: 0.5,
            },
            MerchantRule {
                label: "Whole Foods Market".to_string(),
                networks: vec!["amex".to_string()],
                card_types: Vec::new(),
                factor: 0.9,
            },
        ]
        .into_iter()
        .map(|rule| (normalize_merchant_name(&rule.label), rule))
        .collect();

        let mcc_rules = [
            MerchantRule {
                label: "4900".to_string(),
                networks: Vec::new(),
                card_types: vec![CardType::Credit],
                factor: 0.9,
            },
            MerchantRule {
                label: "5541".to_string(),
                networks: Vec::new(),
                card_types: vec![CardType::Credit],
                factor: 0.95,
            },
        ]
        .into_iter()
        .map(|rule| (rule.label.clone(), rule))
        .collect();

        Self {
            network_mismatch_factor: DEFAULT_NETWORK_MISMATCH_FACTOR,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            merchant_rules,
            mcc_rules,
        }
    }
}

impl PenaltySettings {
    /// A rule table present in the document replaces the built-in table; an absent one keeps it.
    fn from_document(document: PenaltyDocument) -> Result<Self, DecisionError> {
        let defaults = Self::default();
        penalty_factor("penalty.network_mismatch_factor", document.network_mismatch_factor)?;
        if !(document.fuzzy_threshold > 0.0 && document.fuzzy_threshold <= 1.0) {
            return Err(DecisionError::config(
                "penalty.fuzzy_threshold must lie in (0, 1]",
            ));
        }

        let merchant_rules = match document.merchant_rules {
            None => defaults.merchant_rules,
            Some(raw) => {
                let mut merchant_rules = BTreeMap::new();
                for (name, rule) in raw {
                    let key = normalize_merchant_name(&name);
                    if key.is_empty() {
                        return Err(DecisionError::config(format!(
                            "penalty.merchant_rules has an unusable name '{name}'"
                        )));
                    }
                    let rule = MerchantRule::from_document("penalty.merchant_rules", name, rule)?;
                    if let Some(existing) = merchant_rules.insert(key, rule) {
                        return Err(DecisionError::config(format!(
                            "penalty.merchant_rules has names that normalize identically ('{}')",
                            existing.label
                        )));
                    }
                }
                merchant_rules
            }
        };

        let mcc_rules = match document.mcc_rules {
            None => defaults.mcc_rules,
            Some(raw) => {
                let mut mcc_rules = BTreeMap::new();
                for (mcc, rule) in raw {
                    let key = mcc.trim().to_string();
                    let rule = MerchantRule::from_document("penalty.mcc_rules", mcc, rule)?;
                    if mcc_rules.insert(key.clone(), rule).is_some() {
                        return Err(DecisionError::config(format!(
                            "penalty.mcc_rules has duplicate entries for '{key}'"
                        )));
                    }
                }
                mcc_rules
            }
        };

        Ok(Self {
            network_mismatch_factor: document.network_mismatch_factor,
            fuzzy_threshold: document.fuzzy_threshold,
            merchant_rules,
            mcc_rules,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainSettings {
    pub top_drivers: usize,
}

impl Default for ExplainSettings {
    fn default() -> Self {
        Self {
            top_drivers: DEFAULT_TOP_DRIVERS,
        }
    }
}

/// Identity stamped on every audit so a decision can be traced to its snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigIdentity {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_on: Option<NaiveDate>,
}

impl fmt::Display for ConfigIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.published_on {
            Some(date) => write!(f, "{} ({date})", self.version),
            None => f.write_str(&self.version),
        }
    }
}

/// Validated, immutable configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightConfig {
    pub identity: ConfigIdentity,
    pub mcc_weights: CategoryTable,
    pub amount_weights: RangeTable,
    pub issuer_weights: CategoryTable,
    pub cross_border_weights: CrossBorderWeights,
    pub location_weights: RangeTable,
    pub velocity_24h_weights: RangeTable,
    pub velocity_7d_weights: RangeTable,
    pub chargeback_weights: RangeTable,
    pub merchant_risk_weights: CategoryTable,
    pub loyalty_weights: CategoryTable,
    pub calibrator: Calibrator,
    pub preference: PreferenceSettings,
    pub penalty: PenaltySettings,
    pub explain: ExplainSettings,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            identity: ConfigIdentity {
                version: BUILTIN_VERSION.to_string(),
                published_on: None,
            },
            mcc_weights: CategoryTable::trusted(KeyStyle::Exact, 0.0, DEFAULT_MCC_WEIGHTS),
            amount_weights: RangeTable::trusted(DEFAULT_AMOUNT_BUCKETS),
            issuer_weights: CategoryTable::trusted(KeyStyle::Lower, 0.0, DEFAULT_ISSUER_WEIGHTS),
            cross_border_weights: CrossBorderWeights::default(),
            location_weights: RangeTable::trusted(DEFAULT_LOCATION_BUCKETS),
            velocity_24h_weights: RangeTable::trusted(DEFAULT_VELOCITY_24H_BUCKETS),
            velocity_7d_weights: RangeTable::trusted(DEFAULT_VELOCITY_7D_BUCKETS),
            chargeback_weights: RangeTable::trusted(DEFAULT_CHARGEBACK_BUCKETS),
            merchant_risk_weights: CategoryTable::trusted(
                KeyStyle::Lower,
                0.0,
                DEFAULT_MERCHANT_RISK_WEIGHTS,
            ),
            loyalty_weights: CategoryTable::trusted(KeyStyle::Upper, 0.0, DEFAULT_LOYALTY_WEIGHTS),
            calibrator: Calibrator::default(),
            preference: PreferenceSettings::default(),
            penalty: PenaltySettings::default(),
            explain: ExplainSettings::default(),
        }
    }
}

impl WeightConfig {
    pub fn from_document(document: WeightConfigDocument) -> Result<Self, DecisionError> {
        let defaults = Self::default();

        let version = document
            .version
            .map(|version| version.trim().to_string())
            .filter(|version| !version.is_empty())
            .unwrap_or_else(|| UNVERSIONED.to_string());

        let category = |table: &str, style, raw: Option<BTreeMap<String, f64>>, fallback| match raw {
            Some(raw) => CategoryTable::from_map(table, style, raw),
            None => Ok(fallback),
        };
        let range = |table: &str, raw: Option<Vec<RangeBucket>>, fallback| match raw {
            Some(raw) => RangeTable::from_buckets(table, raw),
            None => Ok(fallback),
        };

        let velocity = document.velocity_weights.unwrap_or_default();
        let method = CalibrationMethod::parse(&document.calibration.method)?;
        let bounds = document.bounds.validate()?;
        let calibrator = Calibrator::new(
            method,
            document.calibration.scale,
            document.calibration.bias,
            bounds,
        )?;

        Ok(Self {
            identity: ConfigIdentity {
                version,
                published_on: document.published_on,
            },
            mcc_weights: category(
                "mcc_weights",
                KeyStyle::Exact,
                document.mcc_weights,
                defaults.mcc_weights,
            )?,
            amount_weights: range("amount_weights", document.amount_weights, defaults.amount_weights)?,
            issuer_weights: category(
                "issuer_weights",
                KeyStyle::Lower,
                document.issuer_weights,
                defaults.issuer_weights,
            )?,
            cross_border_weights: document
                .cross_border_weights
                .unwrap_or(defaults.cross_border_weights)
                .validate()?,
            location_weights: range(
                "location_weights",
                document.location_weights,
                defaults.location_weights,
            )?,
            velocity_24h_weights: range(
                "velocity_weights.24h",
                velocity.last_24h,
                defaults.velocity_24h_weights,
            )?,
            velocity_7d_weights: range(
                "velocity_weights.7d",
                velocity.last_7d,
                defaults.velocity_7d_weights,
            )?,
            chargeback_weights: range(
                "chargeback_weights",
                document.chargeback_weights,
                defaults.chargeback_weights,
            )?,
            merchant_risk_weights: category(
                "merchant_risk_weights",
                KeyStyle::Lower,
                document.merchant_risk_weights,
                defaults.merchant_risk_weights,
            )?,
            loyalty_weights: category(
                "loyalty_weights",
                KeyStyle::Upper,
                document.loyalty_weights,
                defaults.loyalty_weights,
            )?,
            calibrator,
            preference: match document.preference {
                Some(preference) => PreferenceSettings::from_document(preference)?,
                None => defaults.preference,
            },
            penalty: match document.penalty {
                Some(penalty) => PenaltySettings::from_document(penalty)?,
                None => defaults.penalty,
            },
            explain: document.explain,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DecisionError> {
        let document: WeightConfigDocument = serde_json::from_str(raw)
            .map_err(|err| DecisionError::config(format!("malformed configuration: {err}")))?;
        Self::from_document(document)
    }

    pub fn version(&self) -> &str {
        &self.identity.version
    }
}

fn positive_multiplier(field: &str, value: f64) -> Result<(), DecisionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DecisionError::config(format!(
            "{field} must be a finite positive multiplier, found {value}"
        )))
    }
}

fn penalty_factor(field: &str, value: f64) -> Result<(), DecisionError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(DecisionError::config(format!(
            "{field} must lie in (0, 1], found {value}"
        )))
    }
}

/// Wire representation of a weight configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfigDocument {
    pub version: Option<String>,
    pub published_on: Option<NaiveDate>,
    pub mcc_weights: Option<BTreeMap<String, f64>>,
    pub amount_weights: Option<Vec<RangeBucket>>,
    pub issuer_weights: Option<BTreeMap<String, f64>>,
    pub cross_border_weights: Option<CrossBorderWeights>,
    pub location_weights: Option<Vec<RangeBucket>>,
    pub velocity_weights: Option<VelocityWeightsDocument>,
    pub chargeback_weights: Option<Vec<RangeBucket>>,
    pub merchant_risk_weights: Option<BTreeMap<String, f64>>,
    pub loyalty_weights: Option<BTreeMap<String, f64>>,
    pub calibration: CalibrationDocument,
    pub bounds: ProbabilityBounds,
    pub preference: Option<PreferenceDocument>,
    pub penalty: Option<PenaltyDocument>,
    pub explain: ExplainSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityWeightsDocument {
    #[serde(rename = "24h")]
    pub last_24h: Option<Vec<RangeBucket>>,
    #[serde(rename = "7d")]
    pub last_7d: Option<Vec<RangeBucket>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationDocument {
    pub method: String,
    pub scale: f64,
    pub bias: f64,
}

impl Default for CalibrationDocument {
    fn default() -> Self {
        let calibrator = Calibrator::default();
        Self {
            method: calibrator.method().label().to_string(),
            scale: calibrator.scale(),
            bias: calibrator.bias(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceDocument {
    pub loyalty_multipliers: Option<BTreeMap<String, f64>>,
    pub issuer_affinity_bonus: f64,
    pub category_boost: f64,
    pub min_weight: f64,
    pub max_weight: f64,
}

impl Default for PreferenceDocument {
    fn default() -> Self {
        Self {
            loyalty_multipliers: None,
            issuer_affinity_bonus: DEFAULT_ISSUER_AFFINITY_BONUS,
            category_boost: DEFAULT_CATEGORY_BOOST,
            min_weight: DEFAULT_MIN_WEIGHT,
            max_weight: DEFAULT_MAX_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyDocument {
    pub network_mismatch_factor: f64,
    pub fuzzy_threshold: f64,
    pub merchant_rules: Option<BTreeMap<String, RuleDocument>>,
    pub mcc_rules: Option<BTreeMap<String, RuleDocument>>,
}

impl Default for PenaltyDocument {
    fn default() -> Self {
        Self {
            network_mismatch_factor: DEFAULT_NETWORK_MISMATCH_FACTOR,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            merchant_rules: None,
            mcc_rules: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDocument {
    pub networks: Vec<String>,
    pub card_types: Vec<String>,
    pub factor: f64,
}

impl Default for RuleDocument {
    fn default() -> Self {
        Self {
            networks: Vec::new(),
            card_types: Vec::new(),
            factor: 1.0,
        }
    }
}
