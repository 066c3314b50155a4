//! Smoke test runner for the Customer Churn Prediction API.
//!
//! Walks a running service through health, single prediction, feature
//! importance and batch prediction, printing a pass/fail report.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod models;
pub mod report;
pub mod runner;

pub use client::{ChurnApiClient, Reply};
pub use config::Config;
pub use error::{Result, SmokeError};
pub use mock::MockService;
pub use models::*;
pub use report::Reporter;
pub use runner::{Check, CheckResult, RunEnd, RunSummary, SmokeRunner};
