//! HTTP gateway (Axum) for text and claim verification.
//!
//! `/predict_text` and `/verify_claim` are mounted only when their model is
//! loaded; each route carries its own [`Pipeline`] as state.

pub mod contract;
pub mod error;
pub mod handler;
pub mod state;
pub mod validate;


use std::collections::BTreeMap;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, header},
    response::Response,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use contract::{
    ClaimVerdictResponse, TextVerdictResponse, format_percentage, parse_percentage,
};
pub use error::{ErrorResponse, GatewayError};
pub use handler::{predict_text_handler, verify_claim_handler};
pub use state::{AppState, Classifiers, EndpointReport, Pipeline};

use handler::ok_response;

pub fn create_router_with_state(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    let mut router = Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler));

    if let Some(pipeline) = &state.text {
        router = router.route(
            pipeline.endpoint.route(),
            post(predict_text_handler).with_state(pipeline.clone()),
        );
    }
    if let Some(pipeline) = &state.claim {
        router = router.route(
            pipeline.endpoint.route(),
            post(verify_claim_handler).with_state(pipeline.clone()),
        );
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

fn endpoint_reports(state: &AppState) -> BTreeMap<String, EndpointReport> {
    state
        .pipelines()
        .map(|pipeline| (pipeline.endpoint.as_str().to_string(), pipeline.report()))
        .collect()
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RootResponse {
    pub status: String,
    /// Keyed `text` / `claim`; only loaded endpoints appear.
    pub endpoints: BTreeMap<String, EndpointReport>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub endpoints: BTreeMap<String, EndpointReport>,
    /// RFC 3339 timestamp of model load.
    pub loaded_at: String,
}

#[tracing::instrument(skip(state))]
pub async fn root_handler(State(state): State<AppState>) -> Response {
    ok_response(RootResponse {
        status: "online".to_string(),
        endpoints: endpoint_reports(&state),
    })
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    ok_response(HealthResponse {
        status: "ok".to_string(),
    })
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    ok_response(ReadyResponse {
        status: "ok".to_string(),
        endpoints: endpoint_reports(&state),
        loaded_at: state.loaded_at.to_rfc3339(),
    })
}
