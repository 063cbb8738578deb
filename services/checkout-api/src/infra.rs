use checkout_decision::checkout::{CardCatalog, DecisionEngine, TransactionContext};
use checkout_decision::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engine and catalog shared by the checkout routes.
#[derive(Clone)]
pub(crate) struct CheckoutState {
    pub(crate) engine: DecisionEngine,
    pub(crate) catalog: Arc<CardCatalog>,
}

pub(crate) fn load_catalog(path: Option<&Path>) -> Result<CardCatalog, AppError> {
    let Some(path) = path else {
        warn!("no card catalog configured; requests must supply candidates");
        return Ok(CardCatalog::default());
    };

    let catalog = CardCatalog::from_path(path)?;
    info!(path = %path.display(), cards = catalog.len(), "loaded card catalog");
    Ok(catalog)
}

pub(crate) fn read_context(path: &Path) -> Result<TransactionContext, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample(relative: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../config")
            .join(relative)
    }

    #[test]
    fn missing_catalog_path_yields_empty_catalog() {
        let catalog = load_catalog(None).expect("empty catalog");
        assert!(catalog.is_empty());
    }

    #[test]
    fn loads_sample_files() {
        let catalog = load_catalog(Some(&sample("cards.sample.csv"))).expect("catalog loads");
        assert_eq!(catalog.len(), 5);

        let context = read_context(&sample("context.sample.json")).expect("context parses");
        assert_eq!(context.card_issuer.as_deref(), Some("visa"));
    }
}
