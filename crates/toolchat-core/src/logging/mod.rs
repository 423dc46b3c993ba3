//! Logging capability injected into every component
//!
//! Nothing in this crate logs through a global: components receive an
//! `Arc<dyn Logger>` when they are built.

mod traits;
mod noop;
mod file;
mod fanout;
mod tracing_logger;

pub use traits::{Logger, LogLevel};
pub use noop::{NoOpLogger, MemoryLogger};
pub use file::{FileLogger, DEFAULT_MAX_BYTES};
pub use fanout::FanoutLogger;
pub use tracing_logger::TracingLogger;
