use anyhow::Context;
use authgate_config::ServiceConfig;
use authgate_server::{build_engine, router, serve, shutdown_signal, Endpoint};
use authgate_utils::{init as init_logging, LogSettings};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

const PROGRAM: &str = "authgate";

#[derive(Parser)]
#[command(name = "authgate")]
#[command(about = "External authorization backend for reverse-proxy subrequests", long_about = None)]
#[command(version)]
struct Cli {
    /// Validate the configuration and exit without listening
    #[arg(long)]
    check: bool,

    /// Configuration file (JSON, YAML or TOML)
    config_file: PathBuf,
}

fn log_settings(config: &ServiceConfig) -> LogSettings {
    LogSettings {
        program: PROGRAM.to_string(),
        verbosity: config.logging.logging_level,
        console: config.logging.enable_console,
        logfile: config.logging.logfile.clone(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ServiceConfig::load(&cli.config_file)
        .with_context(|| format!("invalid configuration {}", cli.config_file.display()))?;
    for warning in config.warnings() {
        eprintln!("{PROGRAM}: warning: {warning}");
    }

    // Building the engine also loads the rights table and checks labels
    let engine = build_engine(&config).context("could not start")?;

    if cli.check {
        println!("{}: configuration OK", cli.config_file.display());
        return Ok(());
    }

    init_logging(&log_settings(&config))
        .map_err(|e| anyhow::anyhow!("could not initialize logging: {e}"))?;
    tracing::debug!(engine = ?engine, "decision engine ready");

    let endpoint = Endpoint::from_config(&config);
    serve(&endpoint, router(Arc::new(engine)), shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}
