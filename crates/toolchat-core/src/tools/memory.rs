//! In-process tool host

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::host::{ToolHost, ToolHostError, ToolHostResult};
use crate::types::{ToolDescriptor, ToolOutput};

type Handler = Arc<dyn Fn(&Value) -> Result<String, String> + Send + Sync>;

/// Tool host backed by closures, with a recorded call log.
///
/// Useful for exercising the orchestrator without spawning a process:
/// the catalog can be changed between queries and individual tools can be
/// made to break the channel.
#[derive(Default)]
pub struct InMemoryToolHost {
    catalog: RwLock<Vec<ToolDescriptor>>,
    handlers: RwLock<HashMap<String, Handler>>,
    broken: RwLock<Vec<String>>,
    calls: RwLock<Vec<(String, Value)>>,
    list_count: RwLock<usize>,
}

impl InMemoryToolHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool and its handler; replaces a tool of the same name
    pub fn register<F>(&self, descriptor: ToolDescriptor, handler: F)
    where
        F: Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
    {
        let name = descriptor.name.clone();
        let mut catalog = self.catalog.write();
        catalog.retain(|t| t.name != name);
        catalog.push(descriptor);
        self.handlers.write().insert(name, Arc::new(handler));
    }

    /// Builder-style `register`
    pub fn with_tool<F>(self, descriptor: ToolDescriptor, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
    {
        self.register(descriptor, handler);
        self
    }

    /// Remove a tool from the catalog
    pub fn unregister(&self, name: &str) {
        self.catalog.write().retain(|t| t.name != name);
        self.handlers.write().remove(name);
    }

    /// Make calls to `name` fail as a channel error
    pub fn break_channel_on(&self, name: &str) {
        self.broken.write().push(name.to_string());
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.read().clone()
    }

    /// Number of catalog fetches served
    pub fn list_count(&self) -> usize {
        *self.list_count.read()
    }
}

#[async_trait]
impl ToolHost for InMemoryToolHost {
    async fn list_tools(&self) -> ToolHostResult<Vec<ToolDescriptor>> {
        *self.list_count.write() += 1;
        Ok(self.catalog.read().clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolHostResult<ToolOutput> {
        self.calls.write().push((name.to_string(), arguments.clone()));

        if self.broken.read().iter().any(|b| b == name) {
            return Err(ToolHostError::channel(format!("connection lost while calling {}", name)));
        }
        let handler = self
            .handlers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ToolHostError::dispatch(name, format!("unknown tool: {}", name)))?;

        Ok(match handler(&arguments) {
            Ok(text) => ToolOutput::text(text),
            Err(text) => ToolOutput::error(text),
        })
    }
}
