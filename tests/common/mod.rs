//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use dmn_evaluator::config::EvaluatorConfig;
use dmn_evaluator::http::HttpServer;
use dmn_evaluator::lifecycle::Shutdown;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const ENGINE_PATH: &str = "/v2/decision-definitions/evaluation";

type Responder = Arc<dyn Fn(&Value) -> (u16, Value) + Send + Sync>;

/// One request seen by the mock engine.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct EngineState {
    responder: Responder,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    delay: Duration,
}

/// A running mock decision engine.
pub struct MockEngine {
    pub url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockEngine {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// Start a programmable mock engine on an ephemeral port.
pub async fn start_mock_engine<F>(responder: F) -> MockEngine
where
    F: Fn(&Value) -> (u16, Value) + Send + Sync + 'static,
{
    start_slow_engine(Duration::ZERO, responder).await
}

/// Like `start_mock_engine`, but every answer is delayed.
pub async fn start_slow_engine<F>(delay: Duration, responder: F) -> MockEngine
where
    F: Fn(&Value) -> (u16, Value) + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = EngineState {
        responder: Arc::new(responder),
        calls: calls.clone(),
        delay,
    };

    let app = Router::new()
        .route(ENGINE_PATH, post(evaluate))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockEngine {
        url: format!("http://{}{}", addr, ENGINE_PATH),
        calls,
    }
}

async fn evaluate(
    State(state): State<EngineState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.calls.lock().unwrap().push(RecordedCall {
        authorization,
        body: body.clone(),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let (status, reply) = (state.responder)(&body);
    (StatusCode::from_u16(status).unwrap(), Json(reply))
}

/// Deterministic routing table: the queue is derived from the subject or route.
pub fn routing_table(request: &Value) -> (u16, Value) {
    let vars = &request["variables"];
    let label = vars["subject"]
        .as_str()
        .or_else(|| vars["route"].as_str())
        .unwrap_or("default")
        .to_lowercase();

    (
        200,
        json!({
            "decisionOutput": json!({ "queue": label, "from": vars["from"] }).to_string(),
            "decisionId": request["decisionId"],
            "decisionName": "Email routing",
            "decisionRequirementsId": request["decisionRequirementsId"],
            "tenantId": "<default>"
        }),
    )
}

/// Evaluator config pointing at `engine_url`.
pub fn test_config(engine_url: &str) -> EvaluatorConfig {
    let mut config = EvaluatorConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.engine.url = engine_url.to_string();
    config.engine.request_timeout_secs = 5;
    config
}

/// Start the evaluator on an ephemeral port.
pub async fn start_evaluator(config: EvaluatorConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::from_config(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// POST a JSON body to `/evaluate`, returning status and parsed body.
pub async fn post_evaluate(addr: SocketAddr, body: &Value) -> (u16, Value) {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .post(format!("http://{}/evaluate", addr))
        .json(body)
        .send()
        .await
        .expect("Evaluator unreachable");
    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}
