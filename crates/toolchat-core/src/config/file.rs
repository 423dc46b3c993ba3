//! YAML configuration file
//!
//! Default location is `~/.config/toolchat/config.yaml`; every field is
//! optional and environment values take precedence over it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    /// LLM provider id (`anthropic`, `openai`, `openai-compatible`, `mock`, ...)
    pub provider: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
    /// Maximum tokens per completion
    pub max_tokens: Option<u32>,
    /// System prompt sent with every backend call
    pub system_prompt: Option<String>,
    /// How to launch the tool host
    pub server: ServerSection,
    /// Log sinks
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub command: Option<String>,
    pub script: Option<PathBuf>,
    /// Extra arguments after the script
    pub args: Vec<String>,
    /// Environment variables passed to the tool host
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
    /// Log file path; an empty string disables the file sink
    pub file: Option<String>,
}

impl ConfigFile {
    /// User-level config path (`~/.config/toolchat/config.yaml`)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("toolchat").join("config.yaml")
    }

    /// Load from an explicit path; the file must exist
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Load from `path` when given, else from the user path if present
    pub fn discover(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let user = Self::user_path();
                if user.exists() {
                    Self::load(user)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write the file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content)?;
        Ok(())
    }
}
