use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog cards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request snapshot handed to the engine by the checkout surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionContext {
    #[serde(default)]
    pub cart: Option<Cart>,
    #[serde(default)]
    pub merchant: Option<MerchantProfile>,
    #[serde(default)]
    pub customer: CustomerProfile,
    #[serde(default)]
    pub device: Option<DeviceSnapshot>,
    #[serde(default)]
    pub geo: Option<GeoSnapshot>,
    /// Issuer of the card presented at checkout, if the surface knows it.
    #[serde(default)]
    pub card_issuer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub unit_price: NumericInput,
    pub quantity: NumericInput,
    #[serde(default)]
    pub mcc: Option<String>,
}

/// Numeric field as it arrives on the wire; surfaces send either JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Finite, non-negative value or `None` when the input cannot be used in a total.
    pub fn resolve(&self) -> Option<f64> {
        let value = match self {
            NumericInput::Number(value) => *value,
            NumericInput::Text(raw) => raw.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mcc: Option<String>,
    #[serde(default)]
    pub preferred_networks: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub risk_tier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub loyalty_tier: Option<String>,
    #[serde(default)]
    pub velocity_24h: Option<u32>,
    #[serde(default)]
    pub velocity_7d: Option<u32>,
    #[serde(default)]
    pub chargebacks_12m: Option<u32>,
    #[serde(default)]
    pub preferred_cards: Vec<String>,
    #[serde(default)]
    pub preferred_issuers: Vec<String>,
    #[serde(default)]
    pub historical_issuers: Vec<String>,
    #[serde(default)]
    pub loyalty_programs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoSnapshot {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Funding type of a card; merchant rules may target one of these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    Credit,
    Debit,
    Prepaid,
}

impl CardType {
    pub const fn label(self) -> &'static str {
        match self {
            CardType::Credit => "credit",
            CardType::Debit => "debit",
            CardType::Prepaid => "prepaid",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "credit" => Some(Self::Credit),
            "debit" => Some(Self::Debit),
            "prepaid" => Some(Self::Prepaid),
            _ => None,
        }
    }
}

/// Static catalog entry for a card that may be offered at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    #[serde(default)]
    pub name: String,
    pub issuer: String,
    pub network: String,
    #[serde(default)]
    pub card_type: CardType,
    pub base_reward_rate: f64,
    /// MCC to reward multiplier.
    #[serde(default)]
    pub category_bonuses: BTreeMap<String, f64>,
    #[serde(default)]
    pub loyalty_program: Option<String>,
}

impl Candidate {
    pub fn category_multiplier(&self, mcc: &str) -> f64 {
        self.category_bonuses.get(mcc).copied().unwrap_or(1.0)
    }
}
