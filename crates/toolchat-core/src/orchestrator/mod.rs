//! Conversation orchestration
//!
//! ```rust,ignore
//! let registry = ToolRegistry::new(Arc::new(mcp_client), logger.clone());
//! let mut orchestrator = Orchestrator::new(provider, registry, (&config).into(), logger);
//!
//! let outcome = orchestrator.process_query("How many users are there?").await?;
//! println!("{}", outcome.text);
//! ```

mod conversation;
mod error;
mod reporter;

pub use conversation::{Orchestrator, OrchestratorOptions, TurnOutcome, TurnState};
pub use error::{ErrorKind, OrchestratorError, OrchestratorResult};
pub use reporter::{SilentReporter, TurnReporter};
