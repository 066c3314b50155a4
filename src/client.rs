use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Level;

use crate::config::Config;
use crate::error::{Result, SmokeError};
use crate::models::*;

/// What came back from one endpoint: a decoded 200 body, or any other
/// status together with the raw body text.
#[derive(Debug)]
pub enum Reply<T> {
    Ok(T),
    Rejected { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct ChurnApiClient {
    base_url: String,
    http: Client,
}

impl ChurnApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(&Config { base_url: base_url.into(), ..Config::default() })
    }

    pub fn with_config(cfg: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(cfg.http_user_agent.as_str());
        if let Some(ms) = cfg.http_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build().map_err(SmokeError::Http)?;
        Ok(Self { base_url: cfg.base_url.trim_end_matches('/').to_string(), http })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn truncate_body(body: &str) -> (String, bool) {
        const LIMIT: usize = 500;
        match body.char_indices().nth(LIMIT) {
            Some((idx, _)) => (format!("{}…<truncated {} bytes>", &body[..idx], body.len() - idx), true),
            None => (body.to_string(), false),
        }
    }

    // FastAPI-style errors: {"detail": "..."} or {"detail": [{"msg": ...}, ...]}
    fn parse_error_detail(body: &str) -> Vec<String> {
        let mut messages = Vec::new();
        if let Ok(json) = serde_json::from_str::<Value>(body) {
            match json.get("detail") {
                Some(Value::String(s)) => messages.push(s.clone()),
                Some(Value::Array(items)) => {
                    for item in items { if let Some(m) = item.get("msg").and_then(|m| m.as_str()) { messages.push(m.to_string()); } }
                }
                _ => {}
            }
            if messages.is_empty() { if let Some(m) = json.get("error").and_then(|m| m.as_str()) { messages.push(m.to_string()); } }
        }
        messages
    }

    async fn execute<T: DeserializeOwned>(&self, path: &str, req: RequestBuilder) -> Result<Reply<T>> {
        tracing::debug!(target: "churn.client", url = %format!("{}{}", self.base_url, path), "sending request");
        let resp = req.header("Accept", "application/json").send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if status != StatusCode::OK {
            let (preview, truncated) = Self::truncate_body(&body);
            tracing::event!(
                target: "churn.client",
                Level::WARN,
                http.status = %status,
                http.path = path,
                error.messages = ?Self::parse_error_detail(&body),
                body.truncated = truncated,
                body.preview = preview,
                "non-success response"
            );
            return Ok(Reply::Rejected { status, body });
        }
        serde_json::from_str::<T>(&body).map(Reply::Ok).map_err(|e| {
            tracing::event!(target: "churn.client", tracing::Level::ERROR, http.path = path, error = %e, "could not decode response body");
            SmokeError::Decode { endpoint: path.to_string(), message: e.to_string() }
        })
    }

    pub async fn health(&self) -> Result<Reply<Value>> {
        let path = "/health";
        self.execute(path, self.http.get(format!("{}{}", self.base_url, path))).await
    }

    pub async fn predict(&self, customer: &CustomerRecord) -> Result<Reply<PredictionResponse>> {
        let path = "/predict";
        self.execute(path, self.http.post(format!("{}{}", self.base_url, path)).json(customer)).await
    }

    pub async fn feature_importance(&self) -> Result<Reply<FeatureImportanceResponse>> {
        let path = "/feature-importance";
        self.execute(path, self.http.get(format!("{}{}", self.base_url, path))).await
    }

    pub async fn batch_predict(&self, batch: &BatchRequest) -> Result<Reply<BatchPredictionResponse>> {
        let path = "/batch-predict";
        tracing::debug!(target: "churn.client", customers = batch.customers.len(), "posting batch");
        self.execute(path, self.http.post(format!("{}{}", self.base_url, path)).json(batch)).await
    }
}
