//! HTTP API for the Fleet Estimator.
//!
//! This module exposes a small REST API around the estimation engine
//! using the [`axum`](https://crates.io/crates/axum) framework.  The
//! handlers are adapters: they normalise raw form bodies, call the
//! pure engine and translate failures into `{"error": ...}` envelopes.
//! Contact submissions are forwarded to whatever [`ContactStore`] the
//! router was built with.

use crate::config::ServerConfig;
use crate::contact::{ContactRequest, ContactStore, InMemoryContactStore};
use crate::engine::{estimate, estimate_batch};
use crate::error::{ContactError, EstimateError};
use crate::models::{CalculationInputs, CalculationResult};
use crate::normalize::RawEstimateForm;
use crate::series::{fleet_status, monthly_series, FleetStatusSlice, MonthlySeries};
use crate::token::{decode_result_token, encode_result_token};
use anyhow::Result;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Application state shared across requests.
pub struct AppState {
    pub config: ServerConfig,
    pub contacts: Arc<dyn ContactStore>,
    pub started_at: Instant,
}

/// Build the API router around the given contact store.  Returns the
/// router and a handle to the state.
pub fn build_router(config: ServerConfig, contacts: Arc<dyn ContactStore>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config,
        contacts,
        started_at: Instant::now(),
    });
    let router = Router::new()
        .route("/api/estimate", post(estimate_handler))
        .route("/api/estimate/batch", post(batch_handler))
        .route("/api/dashboard", post(dashboard_handler))
        .route("/api/result", get(result_handler))
        .route("/api/contact", post(contact_handler).get(contact_status_handler))
        .route("/api/health", get(health_handler))
        .with_state(state.clone());
    (router, state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    (status, Json(json!({ "error": message }))).into_response()
}

/// Body and query extraction failures keep axum's status code but use
/// the `{"error": ...}` envelope.
fn rejection_response(status: StatusCode, detail: String) -> Response {
    warn!(%status, error = %detail, "rejected request");
    error_response(status, detail)
}

fn json_rejection(rejection: JsonRejection) -> Response {
    rejection_response(rejection.status(), rejection.body_text())
}

fn estimate_error_response(err: &EstimateError) -> Response {
    if err.is_input_error() {
        warn!(error = %err, "rejected estimate input");
        error_response(StatusCode::BAD_REQUEST, err.to_string())
    } else {
        error!(error = %err, "estimate failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process estimate")
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn presentation_delay(state: &AppState) {
    if !state.config.estimate_delay.is_zero() {
        tokio::time::sleep(state.config.estimate_delay).await;
    }
}

fn normalize_and_estimate(form: &RawEstimateForm) -> Result<CalculationResult, EstimateError> {
    let inputs = form.normalize()?;
    estimate(&inputs)
}

/// Handler for POST /api/estimate
async fn estimate_handler(
    State(app_state): State<Arc<AppState>>,
    body: Result<Json<RawEstimateForm>, JsonRejection>,
) -> impl IntoResponse {
    let Json(form) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection(rejection),
    };
    presentation_delay(&app_state).await;
    match normalize_and_estimate(&form) {
        Ok(result) => {
            info!(
                fleet_size = result.fleet_size,
                vehicle_type = %result.vehicle_type,
                operation_type = %result.operation_type,
                stations = result.charging_infrastructure.required_stations,
                "estimate computed"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(err) => estimate_error_response(&err),
    }
}

/// One entry of a batch response: either a result or an error message.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Ok { result: CalculationResult },
    Err { error: String },
}

impl From<Result<CalculationResult, EstimateError>> for BatchEntry {
    fn from(outcome: Result<CalculationResult, EstimateError>) -> Self {
        match outcome {
            Ok(result) => BatchEntry::Ok { result },
            Err(err) => BatchEntry::Err {
                error: err.to_string(),
            },
        }
    }
}

/// Handler for POST /api/estimate/batch
async fn batch_handler(
    body: Result<Json<Vec<RawEstimateForm>>, JsonRejection>,
) -> impl IntoResponse {
    let Json(forms) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection(rejection),
    };
    let normalized: Vec<Result<CalculationInputs, EstimateError>> =
        forms.iter().map(RawEstimateForm::normalize).collect();
    let valid: Vec<CalculationInputs> = normalized
        .iter()
        .filter_map(|n| n.as_ref().ok().cloned())
        .collect();
    let mut computed = estimate_batch(&valid).into_iter();
    // `computed` holds exactly one outcome per successfully normalised form.
    let entries: Vec<BatchEntry> = normalized
        .into_iter()
        .filter_map(|n| match n {
            Ok(_) => computed.next(),
            Err(err) => Some(Err(err)),
        })
        .map(BatchEntry::from)
        .collect();
    info!(scenarios = entries.len(), "batch estimate computed");
    (StatusCode::OK, Json(entries)).into_response()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub result: CalculationResult,
    /// Base64 token for the results page's `d` parameter.
    pub result_token: String,
    pub monthly: MonthlySeries,
    pub fleet_status: Vec<FleetStatusSlice>,
}

/// Handler for POST /api/dashboard
async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    body: Result<Json<RawEstimateForm>, JsonRejection>,
) -> impl IntoResponse {
    let Json(form) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection(rejection),
    };
    presentation_delay(&app_state).await;
    let result = match normalize_and_estimate(&form) {
        Ok(result) => result,
        Err(err) => return estimate_error_response(&err),
    };
    let result_token = match encode_result_token(&result) {
        Ok(token) => token,
        Err(err) => {
            error!(error = %err, "failed to encode result token");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process estimate");
        }
    };
    let body = DashboardResponse {
        monthly: monthly_series(&result),
        fleet_status: fleet_status(result.fleet_size),
        result_token,
        result,
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[derive(Debug, Deserialize)]
struct ResultQuery {
    d: String,
}

/// Handler for GET /api/result?d=<token>
async fn result_handler(query: Result<Query<ResultQuery>, QueryRejection>) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match decode_result_token(&query.d) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            warn!(error = %err, "rejected result token");
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
    }
}

/// Handler for POST /api/contact
async fn contact_handler(
    State(app_state): State<Arc<AppState>>,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection(rejection),
    };
    let submission = match request.into_submission(Utc::now()) {
        Ok(submission) => submission,
        Err(err @ ContactError::MissingRequired) => {
            return error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!(error = %err, "failed to build contact row");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error saving contact information",
            );
        }
    };
    match app_state.contacts.insert(submission).await {
        Ok(contact_id) => {
            info!(contact_id, "contact saved");
            let body = json!({
                "success": true,
                "message": "Contact information saved successfully",
                "contactId": contact_id,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to save contact");
            let body = json!({
                "error": "Error saving contact information",
                "details": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Handler for GET /api/contact
async fn contact_status_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    match app_state.contacts.count().await {
        Ok(total) => {
            let body = json!({
                "status": "OK",
                "message": "Contact API is running and the contact store is connected",
                "timestamp": timestamp(),
                "totalSubmissions": total,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!(error = %err, "contact store health check failed");
            let body = json!({
                "status": "ERROR",
                "message": "Contact store connection failed",
                "error": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Handler for GET /api/health
async fn health_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "uptime": app_state.started_at.elapsed().as_secs_f64(),
        "environment": app_state.config.environment,
    });
    (StatusCode::OK, Json(body))
}

/// Launch the API server with an in-memory contact store.  Blocks
/// until the server terminates.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.bind_addr.clone();
    let (router, _state) = build_router(config, Arc::new(InMemoryContactStore::new()));
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
