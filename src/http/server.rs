//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limit, request ID)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::EvaluatorConfig;
use crate::engine::{DecisionEngine, EngineResult, HttpDecisionEngine};
use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::pipeline::Pipeline;
use crate::relay::DecisionRelay;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub started_at: Instant,
}

/// HTTP server for the evaluator.
pub struct HttpServer {
    router: Router,
    config: EvaluatorConfig,
}

impl HttpServer {
    /// Create a server that evaluates through the given engine.
    pub fn new(config: EvaluatorConfig, engine: Arc<dyn DecisionEngine>) -> Self {
        let relay = DecisionRelay::new(engine, config.decision.ids());
        let pipeline = Pipeline::new(relay, config.dispatch.concurrency);

        let state = AppState {
            pipeline,
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Create a server backed by the HTTP decision engine from `config.engine`.
    pub fn from_config(config: EvaluatorConfig) -> EngineResult<Self> {
        let engine = HttpDecisionEngine::new(&config.engine)?;
        Ok(Self::new(config, Arc::new(engine)))
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// There is no whole-request timeout: each engine call is bounded by the
    /// engine client, and every record of a batch must be reported.
    fn build_router(config: &EvaluatorConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::health))
            .route("/evaluate", post(handlers::evaluate))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            decision_id = %self.config.decision.decision_id,
            requirements_id = %self.config.decision.requirements_id,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineResult, EvaluateDecisionRequest, RawDecisionResult};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FixedEngine;

    #[async_trait]
    impl DecisionEngine for FixedEngine {
        async fn evaluate_decision(
            &self,
            request: &EvaluateDecisionRequest,
        ) -> EngineResult<RawDecisionResult> {
            if request.variables.get("subject") == Some(&json!("explode")) {
                panic!("engine client bug");
            }
            Ok(RawDecisionResult {
                decision_output: Some(json!(r#"{"queue":"support"}"#)),
                ..Default::default()
            })
        }
    }

    fn server() -> HttpServer {
        HttpServer::new(EvaluatorConfig::default(), Arc::new(FixedEngine))
    }

    async fn post(body: &'static str) -> (StatusCode, Value, Option<String>) {
        let response = server()
            .router()
            .oneshot(
                Request::post("/evaluate")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap(), request_id)
    }

    #[tokio::test]
    async fn evaluates_bare_email() {
        let (status, body, request_id) =
            post(r#"{"subject":"Hi","from":{"email":"a@x.com"}}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["ok"], json!(true));
        assert_eq!(body["results"][0]["output"], json!({"queue": "support"}));
        assert!(body["evaluated_at"].is_string());
        assert!(request_id.is_some());
    }

    #[tokio::test]
    async fn empty_object_is_bad_request() {
        let (status, body, _) = post("{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No emails found in request body"}));
    }

    #[tokio::test]
    async fn empty_body_is_bad_request() {
        let (status, body, _) = post("").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No emails found in request body"}));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (status, body, _) = post("{\"subject\":").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn panic_is_server_error() {
        let (status, body, _) = post(r#"{"subject":"explode","fromEmail":"a@x.com"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Unhandled pipeline fault: engine client bug"})
        );
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut config = EvaluatorConfig::default();
        config.security.max_body_size = 64;
        let body = format!(
            r#"{{"subject":"{}","fromEmail":"a@x.com"}}"#,
            "x".repeat(128)
        );
        let response = HttpServer::new(config, Arc::new(FixedEngine))
            .router()
            .oneshot(
                Request::post("/evaluate")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn health_reports_decision_id() {
        let response = server()
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["evaluated_decision_id"], json!("dec_email_routing"));
    }

    #[tokio::test]
    async fn inbound_request_id_is_echoed() {
        let response = server()
            .router()
            .oneshot(
                Request::get("/")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-42");
    }
}
