//! Console report for a smoke run.
//!
//! Every line the operator sees is produced here so the runner only decides
//! *what* happened. The writer is generic so tests can capture the report.

use std::io::Write;

use serde_json::Value;

use crate::error::Result;
use crate::models::*;

/// Probabilities and rates are always shown with four decimals.
pub fn fmt_ratio(v: f64) -> String { format!("{:.4}", v) }

/// Strings print bare, everything else as compact JSON.
pub fn display_scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self { Self { out } }

    pub fn into_inner(self) -> W { self.out }

    fn line(&mut self, s: impl AsRef<str>) -> Result<()> {
        writeln!(self.out, "{}", s.as_ref())?;
        Ok(())
    }

    pub fn banner(&mut self) -> Result<()> {
        self.line("Testing Customer Churn Prediction API...")?;
        self.line("=".repeat(50))
    }

    pub fn step(&mut self, number: usize, title: &str) -> Result<()> {
        let lead = if number > 1 { "\n" } else { "" };
        self.line(format!("{}{}. Testing {}...", lead, number, title))
    }

    pub fn health_passed(&mut self, body: &Value) -> Result<()> {
        self.line("✅ Health check passed")?;
        self.line(format!("   Response: {}", body))
    }

    pub fn health_failed(&mut self) -> Result<()> { self.line("❌ Health check failed") }

    pub fn prediction(&mut self, r: &PredictionResponse) -> Result<()> {
        self.line("✅ Single prediction successful")?;
        self.line(format!("   Customer ID: {}", display_scalar(&r.customer_id)))?;
        self.line(format!("   Churn Probability: {}", fmt_ratio(r.churn_probability)))?;
        self.line(format!("   Churn Prediction: {}", display_scalar(&r.churn_prediction)))?;
        self.line(format!("   Risk Level: {}", display_scalar(&r.risk_level)))
    }

    pub fn feature_importance(&mut self, r: &FeatureImportanceResponse) -> Result<()> {
        self.line("✅ Feature importance retrieved")?;
        self.line(format!("   Model: {}", display_scalar(&r.model_name)))?;
        self.line("   Top 5 features:")?;
        for (i, (feature, importance)) in r.top(5).into_iter().enumerate() {
            self.line(format!("     {}. {}: {}", i + 1, feature, fmt_ratio(importance)))?;
        }
        Ok(())
    }

    pub fn batch(&mut self, r: &BatchPredictionResponse) -> Result<()> {
        self.line("✅ Batch prediction successful")?;
        self.line(format!("   Total customers: {}", display_scalar(&r.summary.total_customers)))?;
        self.line(format!("   Predicted churn count: {}", display_scalar(&r.summary.predicted_churn_count)))?;
        self.line(format!("   Predicted churn rate: {}", fmt_ratio(r.summary.predicted_churn_rate)))
    }

    /// Non-fatal failure of a named check, with the service's raw body.
    pub fn check_failed(&mut self, check: &str, body: &str) -> Result<()> {
        self.line(format!("❌ {} failed", check))?;
        self.line(format!("   Error: {}", body))
    }

    pub fn completed(&mut self) -> Result<()> { self.line("\n🎉 All tests completed!") }

    pub fn connection_error(&mut self, server_hint: &str) -> Result<()> {
        self.line("❌ Connection error: Make sure the API server is running")?;
        self.line(format!("   Start the server with: {}", server_hint))
    }

    pub fn aborted(&mut self, description: &str) -> Result<()> {
        self.line(format!("❌ Test failed with error: {}", description))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
