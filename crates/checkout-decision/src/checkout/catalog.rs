use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::domain::{Candidate, CandidateId, CardType};

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { card_id: String, reason: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "failed to read card catalog: {}", err),
            CatalogError::Csv(err) => write!(f, "invalid card catalog CSV: {}", err),
            CatalogError::InvalidRow { card_id, reason } => {
                write!(f, "card '{}' in catalog is invalid: {}", card_id, reason)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Csv(err) => Some(err),
            CatalogError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Static card catalog supplied by the card database export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardCatalog {
    cards: Vec<Candidate>,
}

impl CardCatalog {
    pub fn new(cards: Vec<Candidate>) -> Self {
        Self { cards }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads `id,name,issuer,network,card_type,base_reward_rate,category_bonuses,loyalty_program`
    /// rows; `category_bonuses` holds `MCC=multiplier` pairs separated by `;`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut cards = Vec::new();

        for record in csv_reader.deserialize::<CatalogRow>() {
            let row = record?;
            cards.push(row.into_candidate()?);
        }

        if cards.is_empty() {
            warn!("card catalog contained no rows");
        }

        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[Candidate] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    #[serde(default)]
    name: String,
    issuer: String,
    network: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    card_type: Option<String>,
    base_reward_rate: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category_bonuses: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    loyalty_program: Option<String>,
}

impl CatalogRow {
    fn into_candidate(self) -> Result<Candidate, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidRow {
            card_id: self.id.clone(),
            reason,
        };

        if self.id.is_empty() {
            return Err(invalid("id is empty".to_string()));
        }
        if !self.base_reward_rate.is_finite() || self.base_reward_rate < 0.0 {
            return Err(invalid(format!(
                "base_reward_rate {} is not a non-negative number",
                self.base_reward_rate
            )));
        }

        let card_type = match self.card_type.as_deref() {
            Some(raw) => {
                CardType::parse(raw).ok_or_else(|| invalid(format!("unknown card_type '{raw}'")))?
            }
            None => CardType::default(),
        };

        let category_bonuses = match self.category_bonuses.as_deref() {
            Some(raw) => parse_bonuses(raw).map_err(invalid)?,
            None => BTreeMap::new(),
        };

        Ok(Candidate {
            id: CandidateId(self.id.clone()),
            name: self.name.clone(),
            issuer: self.issuer.clone(),
            network: self.network.clone(),
            card_type,
            base_reward_rate: self.base_reward_rate,
            category_bonuses,
            loyalty_program: self.loyalty_program.clone(),
        })
    }
}

fn parse_bonuses(raw: &str) -> Result<BTreeMap<String, f64>, String> {
    let mut bonuses = BTreeMap::new();
    for pair in raw.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (mcc, multiplier) = pair
            .split_once('=')
            .ok_or_else(|| format!("bonus '{pair}' is not MCC=multiplier"))?;
        let multiplier: f64 = multiplier
            .trim()
            .parse()
            .map_err(|_| format!("bonus '{pair}' has a non-numeric multiplier"))?;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(format!("bonus '{pair}' has a negative or non-finite multiplier"));
        }
        bonuses.insert(mcc.trim().to_string(), multiplier);
    }
    Ok(bonuses)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
