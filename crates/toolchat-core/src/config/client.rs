//! Chat client configuration
//!
//! Values are resolved per key from a `SecretStore` (environment, then
//! `.env`), then the YAML `ConfigFile`, then built-in defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::logging::LogLevel;
use crate::secrets::{ChainSecretStore, DotenvSecretStore, EnvSecretStore, SecretStore};

use super::error::{ConfigError, ConfigResult};
use super::file::ConfigFile;

pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_MAX_TOKENS: u32 = 8000;
pub const DEFAULT_SERVER_COMMAND: &str = "toolchat-host";
pub const DEFAULT_LOG_FILE: &str = "logs/app.log";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a master SQLite assistant. \
Your job is to use the tools at your disposal to execute SQL queries \
and provide the results to the user.";

/// How to spawn the tool host process
#[derive(Debug, Clone, PartialEq)]
pub struct ToolHostLaunch {
    /// Executable name (looked up on PATH) or path
    pub command: String,
    /// Optional script handed to the command as first argument
    pub script: Option<PathBuf>,
    /// Extra arguments after the script
    pub args: Vec<String>,
    /// Extra environment for the child
    pub env: BTreeMap<String, String>,
}

impl ToolHostLaunch {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            script: None,
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Full argument vector (script first, then extra args)
    pub fn argv(&self) -> Vec<String> {
        self.script
            .iter()
            .map(|s| s.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Check that the script exists and the command can be found.
    ///
    /// A command containing a path separator must exist as a file;
    /// a bare name must resolve on `PATH`.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(script) = &self.script {
            if !script.exists() {
                return Err(ConfigError::MissingScript(script.clone()));
            }
        }
        let command = Path::new(&self.command);
        if command.components().count() > 1 {
            if !command.exists() {
                return Err(ConfigError::CommandNotFound(self.command.clone()));
            }
        } else if which::which(&self.command).is_err() {
            return Err(ConfigError::CommandNotFound(self.command.clone()));
        }
        Ok(())
    }
}

/// Resolved configuration of the chat client
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub server: ToolHostLaunch,
    pub log_level: LogLevel,
    /// `None` disables the file sink
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Resolve from the process environment, `./.env` and the YAML file
    pub fn from_env(config_path: Option<&Path>) -> ConfigResult<Self> {
        let store = ChainSecretStore::new(vec![
            Arc::new(EnvSecretStore::new()),
            Arc::new(DotenvSecretStore::from_cwd()?),
        ]);
        let file = ConfigFile::discover(config_path)?;
        let config = Self::resolve(&store, &file)?;
        config.server.validate()?;
        Ok(config)
    }

    /// Resolve from explicit sources without touching the filesystem
    /// for the launch target (see `ToolHostLaunch::validate`).
    pub fn resolve(store: &dyn SecretStore, file: &ConfigFile) -> ConfigResult<Self> {
        let provider = store
            .get("LLM_PROVIDER")
            .or_else(|| file.provider.clone())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
            .to_lowercase();

        let model = store
            .get_any(&["LLM_MODEL", "ANTHROPIC_MODEL"])
            .or_else(|| file.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = store.get("LLM_API_BASE").or_else(|| file.api_base.clone());
        if provider == "openai-compatible" && api_base.is_none() {
            return Err(ConfigError::MissingApiBase(provider));
        }

        let api_key = resolve_api_key(store, &provider)?;

        let max_tokens = match store.get("MAX_TOKENS") {
            Some(raw) => parse_max_tokens(&raw)?,
            None => file.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };
        if max_tokens == 0 {
            return Err(ConfigError::invalid("MAX_TOKENS", "0", "must be positive"));
        }

        let system_prompt = store
            .get("SYSTEM_PROMPT")
            .or_else(|| file.system_prompt.clone())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let server = ToolHostLaunch {
            command: store
                .get("SERVER_COMMAND")
                .or_else(|| file.server.command.clone())
                .unwrap_or_else(|| DEFAULT_SERVER_COMMAND.to_string()),
            script: store
                .get("SERVER_SCRIPT")
                .map(PathBuf::from)
                .or_else(|| file.server.script.clone()),
            args: file.server.args.clone(),
            env: file.server.env.clone(),
        };

        let log_level = match store.get("LOG_LEVEL").or_else(|| file.logging.level.clone()) {
            Some(raw) => raw
                .parse()
                .map_err(|reason: String| ConfigError::invalid("LOG_LEVEL", &raw, reason))?,
            None => LogLevel::Info,
        };

        let log_file = match store.get("LOG_FILE").or_else(|| file.logging.file.clone()) {
            Some(path) if is_disabled(&path) => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };

        Ok(Self {
            provider,
            model,
            api_key,
            api_base,
            max_tokens,
            system_prompt,
            server,
            log_level,
            log_file,
        })
    }
}

/// Providers that work without an API key
pub fn provider_requires_api_key(provider: &str) -> bool {
    !matches!(provider, "mock" | "ollama" | "openai-compatible")
}

fn resolve_api_key(store: &dyn SecretStore, provider: &str) -> ConfigResult<Option<String>> {
    let provider_vars = EnvSecretStore::key_vars_for_provider(provider).unwrap_or(&[]);
    let mut tried = vec!["LLM_API_KEY"];
    tried.extend_from_slice(provider_vars);

    let key = store.get_any(&tried);
    if key.is_none() && provider_requires_api_key(provider) {
        return Err(ConfigError::MissingApiKey {
            provider: provider.to_string(),
            tried: tried.join(", "),
        });
    }
    Ok(key)
}

fn is_disabled(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "" | "off" | "none")
}

fn parse_max_tokens(raw: &str) -> ConfigResult<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|e| ConfigError::invalid("MAX_TOKENS", raw, e.to_string()))
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("server", &self.server)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .finish()
    }
}
