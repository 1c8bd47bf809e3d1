//! HTTP façade: routes to descriptors, results and errors to JSON.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::access::{cors_layer, enforce_origin, AccessGate};
use crate::canonical::CanonicalData;
use crate::descriptor::{InvalidParameter, QueryDescriptor};
use crate::error::FetchError;
use crate::gateway::Gateway;
use crate::health::HealthState;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub health: HealthState,
}

impl AppState {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            health: HealthState::new(),
        }
    }
}

pub fn router(state: AppState, gate: AccessGate) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_handler))
        .route("/scores", get(scores))
        .route("/results/:league/:season", get(results))
        .route("/upcoming/:league/:season", get(upcoming))
        .route("/table/:league/:season", get(table))
        .with_state(state)
        .layer(cors_layer(&gate))
        .layer(middleware::from_fn_with_state(gate, enforce_origin))
        .layer(TraceLayer::new_for_http())
}

pub enum ApiError {
    BadRequest(InvalidParameter),
    Fetch(FetchError),
}

impl From<InvalidParameter> for ApiError {
    fn from(e: InvalidParameter) -> Self {
        ApiError::BadRequest(e)
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        ApiError::Fetch(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Fetch(e) => {
                let status = match e {
                    FetchError::UpstreamUnreachable { .. } => StatusCode::GATEWAY_TIMEOUT,
                    FetchError::Aborted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    FetchError::UpstreamStatus { .. } | FetchError::UpstreamMalformed { .. } => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                (status, format!("{}: {}", e.kind(), e))
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult = Result<Json<Arc<CanonicalData>>, ApiError>;

async fn serve(state: &AppState, descriptor: QueryDescriptor) -> ApiResult {
    match state.gateway.resolve(&descriptor).await {
        Ok(data) => {
            state.health.record_success().await;
            Ok(Json(data))
        }
        Err(e) => {
            state.health.record_error().await;
            debug!("Serving {} error for {}", e.kind(), descriptor.cache_key());
            Err(e.into())
        }
    }
}

async fn index() -> &'static str {
    "Football API Proxy is running!"
}

async fn scores(State(state): State<AppState>) -> ApiResult {
    serve(&state, QueryDescriptor::LiveMatches).await
}

async fn results(
    State(state): State<AppState>,
    Path((league, season)): Path<(String, String)>,
) -> ApiResult {
    serve(&state, QueryDescriptor::results(&league, &season)?).await
}

async fn upcoming(
    State(state): State<AppState>,
    Path((league, season)): Path<(String, String)>,
) -> ApiResult {
    serve(&state, QueryDescriptor::upcoming(&league, &season)?).await
}

async fn table(
    State(state): State<AppState>,
    Path((league, season)): Path<(String, String)>,
) -> ApiResult {
    serve(&state, QueryDescriptor::table(&league, &season)?).await
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let last_success = *state.health.last_success.read().await;
    let errors = *state.health.consecutive_errors.read().await;
    let cached_keys = state.gateway.cache().len().await;

    let status = if errors > 5 { "degraded" } else { "ok" };

    let http_status = if errors > 10 {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        http_status,
        Json(json!({
            "service": "scores-gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "provider": state.gateway.provider_id(),
            "status": status,
            "cachedKeys": cached_keys,
            "lastSuccess": last_success.map(|t| t.to_rfc3339()),
            "consecutiveErrors": errors
        })),
    )
}
