use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "churn-smoke")]
#[command(about = "Smoke test for the Customer Churn Prediction API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Base URL of the churn service (overrides CHURN_API_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Per-request timeout in milliseconds; no timeout when unset
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
    /// Exit with status 1 if any check fails
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the four checks (default)
    Run,
    /// Serve a fixture implementation of the churn API
    Mock {
        /// Port to listen on (overrides MOCK_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl RunArgs {
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(url) = &self.base_url { cfg.base_url = url.clone(); }
        if let Some(ms) = self.timeout_ms { cfg.http_timeout_ms = Some(ms); }
        if self.strict { cfg.strict_exit = true; }
    }
}
