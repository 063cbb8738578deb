use std::fmt;
use std::path::Path;

use tracing::{info, warn};

use crate::checkout::{DecisionError, WeightConfig, WeightConfigDocument};

#[derive(Debug)]
pub enum WeightConfigLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Decision(DecisionError),
}

impl fmt::Display for WeightConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightConfigLoadError::Io(err) => write!(f, "failed to read weights file: {}", err),
            WeightConfigLoadError::Json(err) => write!(f, "weights file is not valid JSON: {}", err),
            WeightConfigLoadError::Decision(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for WeightConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WeightConfigLoadError::Io(err) => Some(err),
            WeightConfigLoadError::Json(err) => Some(err),
            WeightConfigLoadError::Decision(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for WeightConfigLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for WeightConfigLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<DecisionError> for WeightConfigLoadError {
    fn from(err: DecisionError) -> Self {
        Self::Decision(err)
    }
}

/// Reads a weight configuration snapshot, or the built-in snapshot when no path is given.
pub fn load_weights(path: Option<&Path>) -> Result<WeightConfig, WeightConfigLoadError> {
    let Some(path) = path else {
        warn!("no weights file configured; using built-in weights");
        return Ok(WeightConfig::default());
    };

    let raw = std::fs::read_to_string(path)?;
    let document: WeightConfigDocument = serde_json::from_str(&raw)?;
    let config = WeightConfig::from_document(document)?;
    info!(
        path = %path.display(),
        version = %config.identity,
        "loaded weight configuration"
    );
    Ok(config)
}
