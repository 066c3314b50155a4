//! Fixture implementation of the churn service contract.
//!
//! Serves canned answers for the four endpoints so the runner can be pointed
//! at something real without the model. Any endpoint can be switched to an
//! error status, and every request path is recorded in arrival order.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};

use crate::models::{BatchRequest, CustomerRecord};

#[derive(Clone, Default)]
struct MockState {
    hits: Arc<Mutex<Vec<String>>>,
    overrides: Arc<HashMap<String, (StatusCode, String)>>,
}

impl MockState {
    fn hit(&self, path: &str) -> Option<Response> {
        if let Ok(mut g) = self.hits.lock() { g.push(path.to_string()); }
        self.overrides.get(path).map(|(status, body)| (*status, body.clone()).into_response())
    }
}

#[derive(Clone, Default)]
pub struct MockService {
    hits: Arc<Mutex<Vec<String>>>,
    overrides: HashMap<String, (StatusCode, String)>,
}

impl MockService {
    pub fn new() -> Self { Self::default() }

    /// Make `path` answer with `status` and a raw `body` instead of its canned reply.
    pub fn fail(mut self, path: &str, status: StatusCode, body: impl Into<String>) -> Self {
        self.overrides.insert(path.to_string(), (status, body.into()));
        self
    }

    /// Paths requested so far, oldest first.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn router(&self) -> Router {
        let state = MockState { hits: self.hits.clone(), overrides: Arc::new(self.overrides.clone()) };
        Router::new()
            .route("/health", get(health))
            .route("/predict", post(predict))
            .route("/feature-importance", get(feature_importance))
            .route("/batch-predict", post(batch_predict))
            .with_state(state)
            .layer(
                TraceLayer::new_for_http()
                    .on_request(DefaultOnRequest::new().level(tracing::Level::DEBUG))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::DEBUG))
                    .make_span_with(|req: &Request<_>| {
                        let id = nanoid::nanoid!(8);
                        tracing::debug_span!(
                            "http.request",
                            req.id = %id,
                            http.method = %req.method(),
                            http.path = %req.uri().path(),
                        )
                    }),
            )
    }

    pub async fn serve(&self, port: u16) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(l) => l,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::AddrInUse {
                    tracing::error!(port, "port already in use; is the real churn service running? Try MOCK_PORT or --port");
                }
                return Err(e.into());
            }
        };
        tracing::info!(port, "mock churn service listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn health(State(state): State<MockState>) -> Response {
    if let Some(r) = state.hit("/health") { return r; }
    Json(json!({"status": "ok"})).into_response()
}

async fn predict(State(state): State<MockState>, Json(_customer): Json<CustomerRecord>) -> Response {
    if let Some(r) = state.hit("/predict") { return r; }
    Json(json!({
        "customer_id": "C1",
        "churn_probability": 0.1234,
        "churn_prediction": "No",
        "risk_level": "Low"
    })).into_response()
}

async fn feature_importance(State(state): State<MockState>) -> Response {
    if let Some(r) = state.hit("/feature-importance") { return r; }
    Json(json!({
        "model_name": "rf",
        "feature_importance": {
            "tenure": 0.3,
            "Contract": 0.25,
            "MonthlyCharges": 0.2,
            "TotalCharges": 0.15,
            "gender": 0.1
        }
    })).into_response()
}

async fn batch_predict(State(state): State<MockState>, Json(batch): Json<BatchRequest>) -> Response {
    if let Some(r) = state.hit("/batch-predict") { return r; }
    Json(batch_reply(&batch)).into_response()
}

// Month-to-month customers are the ones flagged as churning.
fn batch_reply(batch: &BatchRequest) -> Value {
    let predictions: Vec<Value> = batch.customers.iter().enumerate().map(|(i, c)| {
        let (probability, prediction, risk) = if c.contract == "Month-to-month" {
            (0.8123, "Yes", "High")
        } else {
            (0.1234, "No", "Low")
        };
        json!({
            "customer_id": format!("C{}", i + 1),
            "churn_probability": probability,
            "churn_prediction": prediction,
            "risk_level": risk
        })
    }).collect();
    let total = batch.customers.len();
    let churned = batch.customers.iter().filter(|c| c.contract == "Month-to-month").count();
    let rate = if total == 0 { 0.0 } else { churned as f64 / total as f64 };
    json!({
        "predictions": predictions,
        "summary": {
            "total_customers": total,
            "predicted_churn_count": churned,
            "predicted_churn_rate": rate
        }
    })
}
