use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{Candidate, Location, TransactionContext};
use super::DecisionError;

pub const UNKNOWN_CATEGORY: &str = "unknown";

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Signals consumed by the rules scorer, in canonical scoring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Mcc,
    Amount,
    IssuerFamily,
    CrossBorder,
    LocationMismatch,
    #[serde(rename = "velocity_24h")]
    Velocity24h,
    #[serde(rename = "velocity_7d")]
    Velocity7d,
    #[serde(rename = "chargebacks_12m")]
    Chargebacks12m,
    MerchantRiskTier,
    LoyaltyTier,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 10] = [
        FeatureKind::Mcc,
        FeatureKind::Amount,
        FeatureKind::IssuerFamily,
        FeatureKind::CrossBorder,
        FeatureKind::LocationMismatch,
        FeatureKind::Velocity24h,
        FeatureKind::Velocity7d,
        FeatureKind::Chargebacks12m,
        FeatureKind::MerchantRiskTier,
        FeatureKind::LoyaltyTier,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            FeatureKind::Mcc => "mcc",
            FeatureKind::Amount => "amount",
            FeatureKind::IssuerFamily => "issuer_family",
            FeatureKind::CrossBorder => "cross_border",
            FeatureKind::LocationMismatch => "location_mismatch",
            FeatureKind::Velocity24h => "velocity_24h",
            FeatureKind::Velocity7d => "velocity_7d",
            FeatureKind::Chargebacks12m => "chargebacks_12m",
            FeatureKind::MerchantRiskTier => "merchant_risk_tier",
            FeatureKind::LoyaltyTier => "loyalty_tier",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Observed value of a feature, kept alongside its contribution for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Decimal(f64),
    Boolean(bool),
    Count(u32),
    Text(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantRiskTier {
    #[default]
    Low,
    Medium,
    High,
}

impl MerchantRiskTier {
    pub const fn label(self) -> &'static str {
        match self {
            MerchantRiskTier::Low => "low",
            MerchantRiskTier::Medium => "medium",
            MerchantRiskTier::High => "high",
        }
    }

    /// Unrecognised tiers resolve to `Low`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoyaltyTier {
    #[default]
    None,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    pub const fn label(self) -> &'static str {
        match self {
            LoyaltyTier::None => "NONE",
            LoyaltyTier::Silver => "SILVER",
            LoyaltyTier::Gold => "GOLD",
            LoyaltyTier::Platinum => "PLATINUM",
        }
    }

    /// Unrecognised tiers resolve to `None`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SILVER" => Self::Silver,
            "GOLD" => Self::Gold,
            "PLATINUM" => Self::Platinum,
            _ => Self::None,
        }
    }
}

/// Normalized, strongly typed view of a transaction context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub amount: f64,
    pub mcc: String,
    /// Dominant MCC of the cart; drives rewards and category boosts, not the score.
    pub cart_mcc: String,
    pub issuer_family: String,
    pub cross_border: bool,
    pub location_mismatch_km: f64,
    pub velocity_24h: u32,
    pub velocity_7d: u32,
    pub chargebacks_12m: u32,
    pub merchant_risk_tier: MerchantRiskTier,
    pub loyalty_tier: LoyaltyTier,
}

impl FeatureVector {
    /// Copy of this vector scored as if paid with `candidate`.
    pub fn for_candidate(&self, candidate: &Candidate) -> FeatureVector {
        FeatureVector {
            issuer_family: issuer_family(Some(&candidate.issuer)),
            ..self.clone()
        }
    }

    pub fn value_of(&self, kind: FeatureKind) -> FeatureValue {
        match kind {
            FeatureKind::Mcc => FeatureValue::Text(self.mcc.clone()),
            FeatureKind::Amount => FeatureValue::Decimal(self.amount),
            FeatureKind::IssuerFamily => FeatureValue::Text(self.issuer_family.clone()),
            FeatureKind::CrossBorder => FeatureValue::Boolean(self.cross_border),
            FeatureKind::LocationMismatch => FeatureValue::Decimal(self.location_mismatch_km),
            FeatureKind::Velocity24h => FeatureValue::Count(self.velocity_24h),
            FeatureKind::Velocity7d => FeatureValue::Count(self.velocity_7d),
            FeatureKind::Chargebacks12m => FeatureValue::Count(self.chargebacks_12m),
            FeatureKind::MerchantRiskTier => {
                FeatureValue::Text(self.merchant_risk_tier.label().to_string())
            }
            FeatureKind::LoyaltyTier => FeatureValue::Text(self.loyalty_tier.label().to_string()),
        }
    }
}

pub fn normalize(context: &TransactionContext) -> Result<FeatureVector, DecisionError> {
    let cart = context
        .cart
        .as_ref()
        .ok_or_else(|| DecisionError::invalid_context("cart is missing"))?;
    let merchant = context
        .merchant
        .as_ref()
        .ok_or_else(|| DecisionError::invalid_context("merchant is missing"))?;

    let mut amount = 0.0;
    let mut spend_by_mcc: BTreeMap<&str, f64> = BTreeMap::new();
    for (index, item) in cart.items.iter().enumerate() {
        let price = item.unit_price.resolve().ok_or_else(|| {
            DecisionError::invalid_context(format!("cart item {index} has an unusable unit_price"))
        })?;
        let quantity = item.quantity.resolve().ok_or_else(|| {
            DecisionError::invalid_context(format!("cart item {index} has an unusable quantity"))
        })?;
        let line_total = price * quantity;
        amount += line_total;
        if let Some(mcc) = non_empty(item.mcc.as_deref()) {
            *spend_by_mcc.entry(mcc).or_insert(0.0) += line_total;
        }
    }

    if !amount.is_finite() {
        return Err(DecisionError::invalid_context("cart total overflows"));
    }

    let merchant_mcc = non_empty(merchant.mcc.as_deref());
    let cart_mcc = dominant_mcc(&spend_by_mcc).or(merchant_mcc);
    let mcc = merchant_mcc.or(cart_mcc);

    let customer = &context.customer;

    Ok(FeatureVector {
        amount,
        mcc: mcc.unwrap_or(UNKNOWN_CATEGORY).to_string(),
        cart_mcc: cart_mcc.unwrap_or(UNKNOWN_CATEGORY).to_string(),
        issuer_family: issuer_family(context.card_issuer.as_deref()),
        cross_border: is_cross_border(context),
        location_mismatch_km: location_mismatch_km(context),
        velocity_24h: customer.velocity_24h.unwrap_or(0),
        velocity_7d: customer.velocity_7d.unwrap_or(0),
        chargebacks_12m: customer.chargebacks_12m.unwrap_or(0),
        merchant_risk_tier: merchant
            .risk_tier
            .as_deref()
            .map(MerchantRiskTier::parse_lenient)
            .unwrap_or_default(),
        loyalty_tier: customer
            .loyalty_tier
            .as_deref()
            .map(LoyaltyTier::parse_lenient)
            .unwrap_or_default(),
    })
}

pub(crate) fn issuer_family(raw: Option<&str>) -> String {
    non_empty(raw)
        .map(|issuer| issuer.to_ascii_lowercase())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Largest line-total MCC; ties go to the smallest code since the map iterates in order.
fn dominant_mcc<'a>(spend_by_mcc: &BTreeMap<&'a str, f64>) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for (&mcc, &spend) in spend_by_mcc {
        match best {
            Some((_, top)) if spend <= top => {}
            _ => best = Some((mcc, spend)),
        }
    }
    best.map(|(mcc, _)| mcc)
}

fn is_cross_border(context: &TransactionContext) -> bool {
    let merchant_country = context
        .merchant
        .as_ref()
        .and_then(|merchant| merchant.location.as_ref())
        .and_then(|location| non_empty(location.country.as_deref()));

    let customer_country = context
        .geo
        .as_ref()
        .and_then(|geo| non_empty(geo.country.as_deref()))
        .or_else(|| {
            context
                .device
                .as_ref()
                .and_then(|device| device.location.as_ref())
                .and_then(|location| non_empty(location.country.as_deref()))
        });

    match (merchant_country, customer_country) {
        (Some(merchant), Some(customer)) => !merchant.eq_ignore_ascii_case(customer),
        _ => false,
    }
}

fn location_mismatch_km(context: &TransactionContext) -> f64 {
    let device = context
        .device
        .as_ref()
        .and_then(|device| device.location.as_ref())
        .and_then(Location::coordinates);
    let geo = context
        .geo
        .as_ref()
        .and_then(|geo| valid_coordinates(geo.lat, geo.lon));

    match (device, geo) {
        (Some(a), Some(b)) => haversine_km(a, b),
        _ => 0.0,
    }
}

impl Location {
    fn coordinates(&self) -> Option<(f64, f64)> {
        valid_coordinates(self.lat, self.lon)
    }
}

fn valid_coordinates(lat: Option<f64>, lon: Option<f64>) -> Option<(f64, f64)> {
    let (lat, lon) = (lat?, lon?);
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);
    valid.then_some((lat, lon))
}

fn haversine_km((lat1, lon1): (f64, f64), (lat2, lon2): (f64, f64)) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    (EARTH_RADIUS_KM * c).max(0.0)
}
