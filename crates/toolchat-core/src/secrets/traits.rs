//! Core traits and types for keyed value lookup

use thiserror::Error;

/// Errors that can occur while loading a store
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store not available: {0}")]
    NotAvailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed entry (column {position}): {content}")]
    Malformed { content: String, position: usize },
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// A value found in a store, with the store that provided it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretValue {
    pub value: String,
    pub source: String,
}

/// Read-only keyed lookup used for API keys and plain settings alike
///
/// Implementations:
/// - `EnvSecretStore`: process environment, with provider-name aliases
/// - `DotenvSecretStore`: a parsed `.env` file
/// - `MemorySecretStore`: in-memory, for tests
/// - `ChainSecretStore`: first match across several stores
///
/// Empty values count as absent in every implementation.
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a value by key
    fn get(&self, key: &str) -> Option<String>;

    /// Check if a value exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Retrieve a value together with the name of the store that had it
    fn lookup(&self, key: &str) -> Option<SecretValue> {
        self.get(key).map(|value| SecretValue {
            value,
            source: self.name().to_string(),
        })
    }

    /// First key in `keys` that has a value
    fn get_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.get(k))
    }
}
