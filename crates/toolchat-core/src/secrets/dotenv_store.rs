//! `.env` file store

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Values parsed once from a `KEY=value` file
///
/// Parsing follows the usual dotenv rules (comments, `export`, single and
/// double quotes, `${VAR}` substitution) via `dotenvy`. A missing file
/// yields an empty store.
#[derive(Debug, Default)]
pub struct DotenvSecretStore {
    path: Option<PathBuf>,
    values: HashMap<String, String>,
}

impl DotenvSecretStore {
    /// Load `.env` from the current working directory
    pub fn from_cwd() -> SecretStoreResult<Self> {
        Self::load(".env")
    }

    /// Load a specific file
    pub fn load(path: impl AsRef<Path>) -> SecretStoreResult<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let values = parse_dotenv(&content)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    /// File the values came from, if it existed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse `.env` content into a map
pub fn parse_dotenv(content: &str) -> SecretStoreResult<HashMap<String, String>> {
    dotenvy::from_read_iter(content.as_bytes())
        .map(|entry| entry.map_err(from_dotenv_error))
        .collect()
}

fn from_dotenv_error(err: dotenvy::Error) -> SecretStoreError {
    match err {
        dotenvy::Error::LineParse(content, position) => SecretStoreError::Malformed { content, position },
        dotenvy::Error::Io(e) => SecretStoreError::Io(e),
        other => SecretStoreError::NotAvailable(other.to_string()),
    }
}

impl SecretStore for DotenvSecretStore {
    fn name(&self) -> &str {
        "dotenv"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
