use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use churn_smoke::cli::{Cli, Command};
use churn_smoke::{Config, MockService, Reporter, SmokeRunner};

fn init_logging(json: bool) {
    // Report goes to stdout; keep logs on stderr and quiet unless asked.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    } else {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut cfg = Config::from_env()?;
    cli.run.apply(&mut cfg);
    cfg.validate()?;
    init_logging(cfg.log_json);
    tracing::debug!(base_url = %cfg.base_url, timeout_ms = ?cfg.http_timeout_ms, strict = cfg.strict_exit, "loaded config");

    match cli.command {
        Some(Command::Mock { port }) => {
            MockService::new().serve(port.unwrap_or(cfg.mock_port)).await?;
            Ok(())
        }
        Some(Command::Run) | None => {
            let runner = SmokeRunner::from_config(&cfg)?;
            let mut reporter = Reporter::new(std::io::stdout().lock());
            let summary = runner.run(&mut reporter).await?;
            let code = summary.exit_code(cfg.strict_exit);
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
    }
}
