use std::env;

use crate::error::{Result, SmokeError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    // None means wait as long as the service takes
    pub http_timeout_ms: Option<u64>,
    pub http_user_agent: String,
    // Non-zero exit status when any check fails (off for manual use)
    pub strict_exit: bool,
    // Command shown to the operator when the service is unreachable
    pub server_hint: String,
    pub log_json: bool,
    pub mock_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout_ms: None,
            http_user_agent: format!("churn-smoke/{}", env!("CARGO_PKG_VERSION")),
            strict_exit: false,
            server_hint: "python api/main.py".to_string(),
            log_json: false,
            mock_port: 8000,
        }
    }
}

fn flag(v: &str) -> bool { v == "1" || v.eq_ignore_ascii_case("true") }

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let base_url = get("CHURN_API_URL").unwrap_or(defaults.base_url);
        let http_timeout_ms = match get("HTTP_TIMEOUT_MS") {
            Some(v) if !v.trim().is_empty() => Some(v.trim().parse::<u64>().map_err(|_| SmokeError::Config(format!("HTTP_TIMEOUT_MS must be a number of milliseconds, got {:?}", v)))?),
            _ => None,
        };
        let http_user_agent = get("HTTP_USER_AGENT").unwrap_or(defaults.http_user_agent);
        let strict_exit = get("SMOKE_STRICT_EXIT").map(|v| flag(&v)).unwrap_or(false);
        let server_hint = get("SMOKE_SERVER_HINT").unwrap_or(defaults.server_hint);
        let log_json = get("LOG_JSON").map(|v| flag(&v)).unwrap_or(false);
        let mock_port = match get("MOCK_PORT") {
            Some(v) if !v.trim().is_empty() => v.trim().parse::<u16>().map_err(|_| SmokeError::Config(format!("MOCK_PORT must be a port number, got {:?}", v)))?,
            _ => defaults.mock_port,
        };

        // validate() runs once CLI overrides have been applied
        Ok(Self { base_url, http_timeout_ms, http_user_agent, strict_exit, server_hint, log_json, mock_port })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SmokeError::Config(format!("base URL must start with http:// or https://, got {:?}", self.base_url)));
        }
        if self.http_timeout_ms == Some(0) {
            return Err(SmokeError::Config("HTTP timeout must be greater than zero".into()));
        }
        Ok(())
    }
}
