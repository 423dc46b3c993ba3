mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use toolchat_core::logging::{FanoutLogger, FileLogger, Logger, TracingLogger};
use toolchat_core::orchestrator::Orchestrator;
use toolchat_core::providers::create_provider;
use toolchat_core::tools::{ToolHost, ToolRegistry};
use toolchat_core::{ClientConfig, McpClient};

use shell::{ConsoleReporter, Shell};

/// Chat with an LLM that can call the toolchat tool host
#[derive(Debug, Parser)]
#[command(name = "toolchat", version, about)]
struct Cli {
    /// YAML config file (default: ~/.config/toolchat/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_logger(config: &ClientConfig) -> Arc<dyn Logger> {
    let mut fanout = FanoutLogger::new(vec![Arc::new(TracingLogger::new("toolchat"))]);
    if let Some(path) = &config.log_file {
        match FileLogger::open(path, config.log_level) {
            Ok(file) => fanout.push(Arc::new(file)),
            Err(e) => warn!("cannot open log file {}: {}", path.display(), e),
        }
    }
    Arc::new(fanout)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match ClientConfig::from_env(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {}", e);
            eprintln!("ConfigurationError: {}", e);
            std::process::exit(1);
        }
    };

    let logger = build_logger(&config);
    info!(provider = %config.provider, model = %config.model, "Starting toolchat");

    let provider = create_provider(&config, logger.clone()).context("failed to create LLM backend")?;

    let client = Arc::new(
        McpClient::connect_child_process(&config.server, logger.clone())
            .await
            .context("failed to start the tool host")?,
    );
    let host: Arc<dyn ToolHost> = client.clone();
    let registry = ToolRegistry::new(host, logger.clone());

    let orchestrator = Orchestrator::new(provider, registry, (&config).into(), logger.clone())
        .with_reporter(Arc::new(ConsoleReporter));

    let mut shell = Shell::new(orchestrator, &config.provider);
    let run_result = shell.run().await;

    // release the registry's handle so the session can be closed
    drop(shell.into_orchestrator());
    match Arc::try_unwrap(client) {
        Ok(client) => {
            if let Err(e) = client.close().await {
                logger.warn(&format!("[main] MCP session did not close cleanly: {}", e));
            }
        }
        Err(_) => logger.warn("[main] MCP session still in use at shutdown"),
    }

    run_result.context("interactive shell failed")?;
    Ok(())
}
