//! Tool host settings

use std::path::PathBuf;
use std::sync::Arc;

use toolchat_core::secrets::{ChainSecretStore, DotenvSecretStore, EnvSecretStore, SecretStore};

use crate::data_source::DEFAULT_DATABASE_PATH;
use crate::error::HostResult;
use crate::resources::DEFAULT_DOCS_PATH;
use crate::server::ToolModule;
use crate::weather::{WeatherSettings, DEFAULT_WEATHER_API_BASE, DEFAULT_WEATHER_LANG};

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub database_path: PathBuf,
    /// Markdown file exposed as a resource
    pub docs_path: PathBuf,
    pub weather: WeatherSettings,
    pub modules: Vec<ToolModule>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            docs_path: PathBuf::from(DEFAULT_DOCS_PATH),
            weather: WeatherSettings::default(),
            modules: ToolModule::ALL.to_vec(),
        }
    }
}

impl HostConfig {
    /// Resolve from the process environment, then `./.env`
    pub fn from_env() -> HostResult<Self> {
        let store = ChainSecretStore::new(vec![
            Arc::new(EnvSecretStore::new()),
            Arc::new(DotenvSecretStore::from_cwd()?),
        ]);
        Self::from_store(&store)
    }

    pub fn from_store(store: &dyn SecretStore) -> HostResult<Self> {
        let modules = match store.get("TOOL_MODULES") {
            Some(list) => ToolModule::parse_list(&list)?,
            None => ToolModule::ALL.to_vec(),
        };

        Ok(Self {
            database_path: store
                .get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            docs_path: store
                .get("DOCS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_PATH)),
            weather: WeatherSettings {
                api_key: store.get("OPENWEATHERMAP_API_KEY"),
                api_base: store
                    .get("WEATHER_API_BASE")
                    .unwrap_or_else(|| DEFAULT_WEATHER_API_BASE.to_string()),
                lang: store
                    .get("WEATHER_LANG")
                    .unwrap_or_else(|| DEFAULT_WEATHER_LANG.to_string()),
            },
            modules,
        })
    }
}
