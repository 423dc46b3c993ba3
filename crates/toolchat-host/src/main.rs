use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::ServiceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use toolchat_core::logging::{Logger, TracingLogger};
use toolchat_host::{HostConfig, ToolHostServer, ToolModule};

/// MCP tool host speaking over stdin/stdout
#[derive(Debug, Parser)]
#[command(name = "toolchat-host", version, about)]
struct Cli {
    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Markdown document served as a resource (overrides DOCS_PATH)
    #[arg(long)]
    docs: Option<PathBuf>,

    /// Comma-separated tool modules to mount (overrides TOOL_MODULES)
    #[arg(long)]
    modules: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol; logs go to stderr
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    let mut config = HostConfig::from_env().context("failed to read tool host configuration")?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    if let Some(path) = cli.docs {
        config.docs_path = path;
    }
    if let Some(list) = cli.modules.as_deref() {
        config.modules = ToolModule::parse_list(list)?;
    }

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new("toolchat-host"));
    let server = ToolHostServer::from_config(&config, logger)?;

    info!(
        database = %config.database_path.display(),
        modules = ?config.modules,
        "Starting MCP tool host on stdio"
    );

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("MCP handshake failed")?;
    service.waiting().await?;

    info!("Client disconnected, shutting down");
    Ok(())
}
