//! LLM backend implementations
//!
//! ## Architecture
//!
//! Hosted providers go through the `genai` crate, which handles the
//! provider-specific protocols and tool calling. OpenRouter and Mistral
//! are routed through genai's OpenAI adapter via `ServiceTargetResolver`.
//!
//! Self-hosted servers that only speak the OpenAI chat completions API
//! (`openai-compatible`) use a small reqwest client instead.
//!
//! Auth always comes from the resolved `ClientConfig`, never from genai's
//! own environment lookup.
//!
//! `ScriptedProvider` backs the `mock` id and the test suites.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod openai_compat;
mod scripted;

pub use traits::{CompletionRequest, Provider, ProviderEndpoint};
pub use error::{ProviderError, ProviderResult};

pub use genai_provider::GenaiProvider;
pub use genai_adapter::{is_genai_native, is_genai_supported};
pub use openai_compat::OpenAiCompatProvider;
pub use scripted::{ScriptStep, ScriptedProvider};

use crate::config::ClientConfig;
use crate::logging::Logger;
use std::sync::Arc;

/// Endpoint and credentials from a resolved configuration
pub fn endpoint_for(config: &ClientConfig) -> ProviderEndpoint {
    ProviderEndpoint {
        api_key: config.api_key.clone(),
        api_base: config.api_base.clone(),
    }
}

/// Create the backend for the configured provider id
pub fn create_provider(config: &ClientConfig, logger: Arc<dyn Logger>) -> ProviderResult<Arc<dyn Provider>> {
    let provider_id = config.provider.to_lowercase();
    let endpoint = endpoint_for(config);

    logger.info(&format!("[providers] Creating provider '{}'", provider_id));

    match provider_id.as_str() {
        "mock" => Ok(Arc::new(ScriptedProvider::echo(logger))),
        "openai-compatible" => Ok(Arc::new(OpenAiCompatProvider::new(&endpoint, logger)?)),
        id if GenaiProvider::supports(id) => Ok(Arc::new(GenaiProvider::new(id, &endpoint, logger))),
        other => Err(ProviderError::Unsupported(other.to_string())),
    }
}

/// List all supported provider IDs
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        // Native genai providers
        "openai",
        "anthropic",
        "gemini",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        // OpenAI-compatible providers via resolver
        "openrouter",
        "mistral",
        // Plain chat completions endpoint
        "openai-compatible",
        // Testing
        "mock",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, ConfigFile};
    use crate::logging::NoOpLogger;
    use crate::secrets::MemorySecretStore;

    fn config(pairs: &[(&str, &str)]) -> ClientConfig {
        let store = MemorySecretStore::from_pairs(pairs.iter().copied());
        ClientConfig::resolve(&store, &ConfigFile::default()).unwrap()
    }

    #[test]
    fn test_every_listed_provider_is_creatable() {
        for id in supported_providers() {
            let mut cfg = config(&[("LLM_PROVIDER", "mock")]);
            cfg.provider = id.to_string();
            cfg.api_base = Some("http://localhost:8000/v1".to_string());
            let provider = create_provider(&cfg, Arc::new(NoOpLogger));
            assert!(provider.is_ok(), "provider {} failed", id);
        }
    }

    #[test]
    fn test_mock_and_compat_names() {
        let mock = create_provider(&config(&[("LLM_PROVIDER", "mock")]), Arc::new(NoOpLogger)).unwrap();
        assert_eq!(mock.name(), "mock");

        let compat = create_provider(
            &config(&[
                ("LLM_PROVIDER", "openai-compatible"),
                ("LLM_API_BASE", "http://localhost:8000/v1"),
            ]),
            Arc::new(NoOpLogger),
        )
        .unwrap();
        assert_eq!(compat.name(), "openai-compatible");
    }

    #[test]
    fn test_unknown_provider() {
        let mut cfg = config(&[("LLM_PROVIDER", "mock")]);
        cfg.provider = "carrier-pigeon".to_string();
        assert!(matches!(
            create_provider(&cfg, Arc::new(NoOpLogger)),
            Err(ProviderError::Unsupported(_))
        ));
    }
}
