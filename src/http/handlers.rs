//! Route handlers.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::pipeline::EvaluationReport;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub evaluated_decision_id: String,
    pub timestamp: String,
    pub uptime_seconds: f64,
}

/// `GET /`
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        message: "DMN evaluator is awake",
        version: env!("CARGO_PKG_VERSION"),
        evaluated_decision_id: state.pipeline.relay().ids().decision_id.clone(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
    })
}

/// `POST /evaluate`
pub async fn evaluate(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers).to_string();

    let response = match evaluate_body(&state, &request_id, &body).await {
        Ok(report) => {
            tracing::info!(
                request_id = %request_id,
                results = report.results.len(),
                ok = report.results.iter().filter(|r| r.is_ok()).count(),
                "Evaluation completed"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => e.into_response(),
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}

async fn evaluate_body(
    state: &AppState,
    request_id: &str,
    body: &[u8],
) -> Result<EvaluationReport, ApiError> {
    // An empty body has nothing to extract; treat it like `null`.
    let payload: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body)?
    };

    tracing::debug!(request_id = %request_id, body = %payload, "Incoming evaluation request");

    Ok(state.pipeline.evaluate(&payload).await?)
}
