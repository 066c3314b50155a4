use std::io::Write;

use crate::client::{ChurnApiClient, Reply};
use crate::config::Config;
use crate::error::{Result, SmokeError};
use crate::models::{BatchRequest, CustomerRecord};
use crate::report::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Health,
    Prediction,
    FeatureImportance,
    BatchPrediction,
}

impl Check {
    pub const ALL: [Check; 4] = [Check::Health, Check::Prediction, Check::FeatureImportance, Check::BatchPrediction];

    pub fn number(self) -> usize {
        match self { Check::Health => 1, Check::Prediction => 2, Check::FeatureImportance => 3, Check::BatchPrediction => 4 }
    }

    /// Used in the "N. Testing ..." header.
    pub fn title(self) -> &'static str {
        match self {
            Check::Health => "health endpoint",
            Check::Prediction => "single prediction",
            Check::FeatureImportance => "feature importance",
            Check::BatchPrediction => "batch prediction",
        }
    }

    /// Used in the "❌ ... failed" line.
    pub fn label(self) -> &'static str {
        match self {
            Check::Health => "Health check",
            Check::Prediction => "Single prediction",
            Check::FeatureImportance => "Feature importance",
            Check::BatchPrediction => "Batch prediction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    Completed,
    HealthFailed,
    ConnectionError(String),
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub check: Check,
    pub passed: bool,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub checks: Vec<CheckResult>,
    pub end: RunEnd,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.end == RunEnd::Completed && self.checks.iter().all(|c| c.passed)
    }

    pub fn attempted(&self) -> Vec<Check> { self.checks.iter().map(|c| c.check).collect() }

    /// Always 0 unless strict mode asks for failures to surface.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && !self.all_passed() { 1 } else { 0 }
    }
}

pub struct SmokeRunner {
    client: ChurnApiClient,
    customer: CustomerRecord,
    server_hint: String,
}

impl SmokeRunner {
    pub fn new(client: ChurnApiClient, server_hint: impl Into<String>) -> Self {
        Self { client, customer: CustomerRecord::example(), server_hint: server_hint.into() }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(ChurnApiClient::with_config(cfg)?, cfg.server_hint.clone()))
    }

    /// Runs the four checks in order. Only a broken report sink is returned
    /// as an error; everything the service does ends up in the summary.
    pub async fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> Result<RunSummary> {
        let mut checks = Vec::with_capacity(Check::ALL.len());
        reporter.banner()?;
        let end = match self.run_checks(reporter, &mut checks).await {
            Ok(end) => end,
            Err(SmokeError::Io(e)) => return Err(SmokeError::Io(e)),
            Err(e) if e.is_connection() => {
                tracing::error!(target: "churn.smoke", base_url = %self.client.base_url(), error = %e, "service unreachable");
                reporter.connection_error(&self.server_hint)?;
                RunEnd::ConnectionError(e.to_string())
            }
            Err(e) => {
                tracing::error!(target: "churn.smoke", error = %e, "smoke run aborted");
                reporter.aborted(&e.to_string())?;
                RunEnd::Aborted(e.to_string())
            }
        };
        reporter.flush()?;
        let summary = RunSummary { checks, end };
        tracing::info!(target: "churn.smoke", attempted = summary.checks.len(), all_passed = summary.all_passed(), end = ?summary.end, "smoke run finished");
        Ok(summary)
    }

    async fn run_checks<W: Write>(&self, reporter: &mut Reporter<W>, checks: &mut Vec<CheckResult>) -> Result<RunEnd> {
        reporter.step(Check::Health.number(), Check::Health.title())?;
        match record(checks, Check::Health, self.client.health().await)? {
            Reply::Ok(body) => reporter.health_passed(&body)?,
            Reply::Rejected { .. } => {
                reporter.health_failed()?;
                return Ok(RunEnd::HealthFailed);
            }
        }

        reporter.step(Check::Prediction.number(), Check::Prediction.title())?;
        match record(checks, Check::Prediction, self.client.predict(&self.customer).await)? {
            Reply::Ok(resp) => reporter.prediction(&resp)?,
            Reply::Rejected { body, .. } => reporter.check_failed(Check::Prediction.label(), &body)?,
        }

        reporter.step(Check::FeatureImportance.number(), Check::FeatureImportance.title())?;
        match record(checks, Check::FeatureImportance, self.client.feature_importance().await)? {
            Reply::Ok(resp) => reporter.feature_importance(&resp)?,
            Reply::Rejected { body, .. } => reporter.check_failed(Check::FeatureImportance.label(), &body)?,
        }

        reporter.step(Check::BatchPrediction.number(), Check::BatchPrediction.title())?;
        let batch = BatchRequest::smoke_batch(&self.customer);
        match record(checks, Check::BatchPrediction, self.client.batch_predict(&batch).await)? {
            Reply::Ok(resp) => reporter.batch(&resp)?,
            Reply::Rejected { body, .. } => reporter.check_failed(Check::BatchPrediction.label(), &body)?,
        }

        reporter.completed()?;
        Ok(RunEnd::Completed)
    }
}

fn record<T>(checks: &mut Vec<CheckResult>, check: Check, reply: Result<Reply<T>>) -> Result<Reply<T>> {
    let passed = matches!(reply, Ok(Reply::Ok(_)));
    tracing::info!(target: "churn.smoke", check = check.label(), passed, "check finished");
    checks.push(CheckResult { check, passed });
    reply
}
