//! Bridge from the injected `Logger` capability to `tracing`

use std::sync::Arc;

use super::traits::Logger;

/// Forwards every line to the process-wide `tracing` subscriber.
///
/// The component label is attached as the `component` field so that
/// lines from the orchestrator and the tool client stay distinguishable.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: Arc<str>,
}

impl TracingLogger {
    pub fn new(component: impl Into<Arc<str>>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("toolchat")
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(component = %self.component, "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(component = %self.component, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(component = %self.component, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(component = %self.component, "{}", message);
    }
}
