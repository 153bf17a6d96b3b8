//! HTTP handlers for the image lookup relay

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::extract::{read_image_field, ImagePayload};
use super::models::{
    HealthResponse, IdentifyParams, StatusResponse, WatchResponse, WATCH_FIELD,
};
use crate::automation::{AutomationClient, AutomationRequest};
use crate::error::RelayError;
use crate::lookup::{IdentifyResult, ImageLookupRelay, ResponseShape};
use crate::metrics::METRICS;

/// Shared, read-only state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ImageLookupRelay>,
    pub automation: Arc<AutomationClient>,
}

/// Error rendered as `{success: false, message}`
#[derive(Debug)]
pub struct StatusFailure(pub RelayError);

impl From<RelayError> for StatusFailure {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for StatusFailure {
    fn into_response(self) -> Response {
        (self.0.status(), Json(StatusResponse::failed(self.0.to_string()))).into_response()
    }
}

fn record(endpoint: &str, start: Instant, outcome: Result<(), &RelayError>) {
    let status = match outcome {
        Ok(()) => "success",
        Err(e) => e.kind(),
    };
    METRICS.record_lookup(endpoint, status, start.elapsed().as_secs_f64());
}

/// Landing route
///
/// GET /
pub async fn root() -> &'static str {
    "Image lookup relay is running."
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        credential_configured: state.relay.has_credential(),
        automation_configured: state.automation.is_configured(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

/// Identify an uploaded or base64-encoded image
///
/// POST /identify
pub async fn identify(
    State(state): State<AppState>,
    params: Result<Query<IdentifyParams>, QueryRejection>,
    ImagePayload(payload): ImagePayload,
) -> Result<Json<IdentifyResult>, RelayError> {
    let start = Instant::now();

    let (shape, payload) = match params {
        Ok(Query(params)) => (params.shape, payload),
        Err(e) => (
            ResponseShape::default(),
            Err(RelayError::client_input(e.body_text())),
        ),
    };

    let limit = state.relay.max_results();
    match state.relay.identify_with_limit(payload, shape, limit).await {
        Ok(result) => {
            record("identify", start, Ok(()));
            info!("Found {} potential matches", result.match_count());
            Ok(Json(result))
        }
        Err(e) => {
            record("identify", start, Err(&e));
            e.log("Identification failed");
            Err(e)
        }
    }
}

/// Identify a watch from an upload in the `watchImage` field
///
/// POST /identify-watch
pub async fn identify_watch(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<WatchResponse>, StatusFailure> {
    let start = Instant::now();

    let payload = match multipart {
        Ok(multipart) => read_image_field(multipart, WATCH_FIELD).await,
        Err(_) => Ok(None),
    };

    let outcome = state
        .relay
        .identify_with_limit(payload, ResponseShape::Projected, 1)
        .await;

    match outcome {
        Ok(result) => {
            record("identify_watch", start, Ok(()));
            let name = result.matches().into_iter().next().and_then(|m| m.title);
            Ok(Json(match name {
                Some(name) => {
                    info!(name = %name, "Watch identified");
                    WatchResponse::found(name)
                }
                None => {
                    info!("No matching watch found");
                    WatchResponse::not_found("No matching watch found.")
                }
            }))
        }
        Err(e) => {
            record("identify_watch", start, Err(&e));
            e.log("Watch identification failed");
            Err(e.into())
        }
    }
}

/// Hand a confirmed match to automation
///
/// POST /send-to-automation
pub async fn send_to_automation(
    State(state): State<AppState>,
    body: Result<Json<AutomationRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, StatusFailure> {
    let Json(request) = body.map_err(|e| RelayError::client_input(e.body_text()))?;

    match state.automation.send(&request).await {
        Ok(message) => {
            METRICS.record_automation(true);
            Ok(Json(StatusResponse::ok(message)))
        }
        Err(e) => {
            METRICS.record_automation(false);
            e.log("Automation handoff failed");
            Err(e.into())
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
