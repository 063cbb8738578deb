use crate::infra::{AppState, CheckoutState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use checkout_decision::checkout::{
    Attribution, Candidate, CompositeResult, ScoreResult, TransactionContext, WeightConfig,
    WeightConfigDocument,
};
use checkout_decision::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct DecideRequest {
    pub(crate) context: TransactionContext,
    /// Cards to rank; the loaded catalog is used when omitted.
    #[serde(default)]
    pub(crate) candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DecideResponse {
    pub(crate) config_version: String,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) ranking: Vec<CompositeResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExplainRequest {
    pub(crate) context: TransactionContext,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExplainResponse {
    pub(crate) config_version: String,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) top_drivers: Vec<Attribution>,
    pub(crate) explanation: ScoreResult,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublishResponse {
    pub(crate) config_version: String,
    pub(crate) previous_version: String,
    pub(crate) generated_at: DateTime<Utc>,
}

pub(crate) fn checkout_router(state: CheckoutState) -> Router {
    Router::new()
        .route("/api/v1/checkout/decide", post(decide_endpoint))
        .route("/api/v1/checkout/explain", post(explain_endpoint))
        .route("/api/v1/checkout/weights", put(publish_weights_endpoint))
        .with_state(state)
}

pub(crate) fn with_checkout_routes(state: CheckoutState) -> Router {
    checkout_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn decide_endpoint(
    State(state): State<CheckoutState>,
    Json(payload): Json<DecideRequest>,
) -> Result<Json<DecideResponse>, AppError> {
    let DecideRequest {
        context,
        candidates,
    } = payload;

    let snapshot = state.engine.snapshot();
    let candidates = candidates.as_deref().unwrap_or_else(|| state.catalog.cards());
    let ranking = checkout_decision::checkout::decide(&context, candidates, &snapshot)?;

    Ok(Json(DecideResponse {
        config_version: snapshot.version().to_string(),
        generated_at: Utc::now(),
        ranking,
    }))
}

pub(crate) async fn explain_endpoint(
    State(state): State<CheckoutState>,
    Json(payload): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, AppError> {
    let snapshot = state.engine.snapshot();
    let explanation = checkout_decision::checkout::explain(&payload.context, &snapshot)?;

    Ok(Json(ExplainResponse {
        config_version: snapshot.version().to_string(),
        generated_at: Utc::now(),
        top_drivers: explanation.top_drivers(snapshot.explain.top_drivers),
        explanation,
    }))
}

pub(crate) async fn publish_weights_endpoint(
    State(state): State<CheckoutState>,
    Json(document): Json<WeightConfigDocument>,
) -> Result<Json<PublishResponse>, AppError> {
    let config = WeightConfig::from_document(document)?;
    let config_version = config.version().to_string();
    let previous = state.engine.publish(config);

    Ok(Json(PublishResponse {
        config_version,
        previous_version: previous.version().to_string(),
        generated_at: Utc::now(),
    }))
}
