//! Environment variable store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Mapping from provider names to the environment variables holding their API key
static PROVIDER_KEY_VARS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("openai-compatible", vec!["OPENAI_API_KEY"]);
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("groq", vec!["GROQ_API_KEY"]);
    m.insert("xai", vec!["XAI_API_KEY"]);
    m.insert("deepseek", vec!["DEEPSEEK_API_KEY"]);
    m.insert("cohere", vec!["COHERE_API_KEY", "CO_API_KEY"]);
    m.insert("mistral", vec!["MISTRAL_API_KEY"]);
    m.insert("openrouter", vec!["OPENROUTER_API_KEY"]);
    m.insert("ollama", vec![]); // Ollama doesn't need an API key
    m.insert("mock", vec![]);
    m
});

/// Store that reads from the process environment
///
/// Keys are first looked up verbatim. A provider name (`anthropic`,
/// `openai`, ...) is also accepted and mapped to its API key variables:
///
/// ```
/// use toolchat_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::new();
/// // Equivalent when ANTHROPIC_API_KEY is set:
/// let a = store.get("anthropic");
/// let b = store.get("ANTHROPIC_API_KEY");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Environment variables that hold the API key for `provider`.
    ///
    /// `None` means the provider is unknown; an empty slice means it
    /// needs no key.
    pub fn key_vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        PROVIDER_KEY_VARS
            .get(provider.to_lowercase().as_str())
            .map(|v| v.as_slice())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = non_empty_var(key) {
            return Some(value);
        }
        Self::key_vars_for_provider(key)?
            .iter()
            .find_map(|var| non_empty_var(var))
    }
}
