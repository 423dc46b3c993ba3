//! Chained store with fallback behavior

use std::sync::Arc;

use super::traits::{SecretStore, SecretValue};

/// Tries each store in order and returns the first match
///
/// # Example
///
/// ```
/// use toolchat_core::secrets::{SecretStore, ChainSecretStore, MemorySecretStore};
/// use std::sync::Arc;
///
/// let overrides = Arc::new(MemorySecretStore::from_pairs([("MAX_TOKENS", "10")]));
/// let defaults = Arc::new(MemorySecretStore::from_pairs([("MAX_TOKENS", "8000")]));
/// let chain = ChainSecretStore::new(vec![overrides, defaults]);
/// assert_eq!(chain.get("MAX_TOKENS"), Some("10".to_string()));
/// ```
#[derive(Clone, Default)]
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// Append a lower-priority store
    pub fn with(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.stores.push(store);
        self
    }

    pub fn stores(&self) -> &[Arc<dyn SecretStore>] {
        &self.stores
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|s| s.get(key))
    }

    fn lookup(&self, key: &str) -> Option<SecretValue> {
        self.stores.iter().find_map(|s| s.lookup(key))
    }
}

impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stores.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainSecretStore")
            .field("stores", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::{DotenvSecretStore, MemorySecretStore};

    #[test]
    fn test_chain_store_first_match_wins() {
        let first = Arc::new(MemorySecretStore::from_pairs([("k", "one")]));
        let second = Arc::new(MemorySecretStore::from_pairs([("k", "two"), ("only", "2")]));
        let chain = ChainSecretStore::new(vec![first, second]);

        assert_eq!(chain.get("k"), Some("one".to_string()));
        assert_eq!(chain.get("only"), Some("2".to_string()));
        assert_eq!(chain.get("missing"), None);
    }

    #[test]
    fn test_chain_store_lookup_reports_inner_source() {
        let chain = ChainSecretStore::default()
            .with(Arc::new(DotenvSecretStore::default()))
            .with(Arc::new(MemorySecretStore::from_pairs([("k", "v")])));

        let found = chain.lookup("k").unwrap();
        assert_eq!(found.source, "memory");
        assert_eq!(chain.stores().len(), 2);
    }

    #[test]
    fn test_empty_chain_finds_nothing() {
        assert_eq!(ChainSecretStore::default().get("anything"), None);
    }
}
