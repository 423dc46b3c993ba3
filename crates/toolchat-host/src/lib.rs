//! Toolchat tool host
//!
//! An MCP server offering arithmetic, a weather lookup and SQL queries
//! against a local SQLite file, plus a code-review prompt and a couple of
//! read-only resources. It is meant to run as a child process of
//! the chat client and talk MCP over stdin/stdout, so nothing here may
//! print to stdout.
//!
//! ```rust,ignore
//! let config = HostConfig::from_env()?;
//! let server = ToolHostServer::from_config(&config, logger)?;
//! server.serve(rmcp::transport::stdio()).await?.waiting().await?;
//! ```

pub mod calculator;
pub mod config;
pub mod data_source;
pub mod error;
pub mod resources;
pub mod server;
pub mod weather;

pub use calculator::{evaluate, CalcError};
pub use config::HostConfig;
pub use data_source::{DataSource, DataSourceError, Rows, SqliteDataSource};
pub use error::{HostError, HostResult};
pub use resources::{ResourceCatalog, ResourceError, CONFIG_URI};
pub use server::{ToolHostServer, ToolHostServerBuilder, ToolModule};
pub use weather::{WeatherClient, WeatherSettings};
