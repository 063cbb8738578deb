use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, CheckoutState};
use crate::routes::with_checkout_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use checkout_decision::checkout::{ConfigHandle, DecisionEngine};
use checkout_decision::config::{load_weights, AppConfig};
use checkout_decision::error::AppError;
use checkout_decision::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let weights = load_weights(config.sources.weights_path.as_deref())?;
    let catalog = load_catalog(config.sources.catalog_path.as_deref())?;
    let checkout_state = CheckoutState {
        engine: DecisionEngine::new(ConfigHandle::new(weights)),
        catalog: Arc::new(catalog),
    };

    let app = with_checkout_routes(checkout_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "checkout decision service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
