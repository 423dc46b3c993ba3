//! Read-only MCP resources: the host's own configuration and a markdown
//! document from disk.

use std::io;
use std::path::{Path, PathBuf};

use rmcp::model::{AnnotateAble, RawResource, Resource, ResourceContents};
use serde_json::{json, Value};
use thiserror::Error;

pub const CONFIG_URI: &str = "data://config";
pub const DEFAULT_DOCS_PATH: &str = "datasources/docs/demo-document.md";

const JSON_MIME: &str = "application/json";
const MARKDOWN_MIME: &str = "text/markdown";

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `file://` URI for a path, made absolute against the working directory
pub fn file_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.to_string_lossy().replace('\\', "/"))
}

#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    config: Value,
    docs_path: PathBuf,
    docs_uri: String,
}

impl ResourceCatalog {
    /// `config` is served verbatim under [`CONFIG_URI`]
    pub fn new(config: Value, docs_path: impl Into<PathBuf>) -> Self {
        let docs_path = docs_path.into();
        let docs_uri = file_uri(&docs_path);
        Self {
            config,
            docs_path,
            docs_uri,
        }
    }

    pub fn docs_uri(&self) -> &str {
        &self.docs_uri
    }

    /// The config resource, plus the document when the file exists
    pub fn list(&self) -> Vec<Resource> {
        let mut config = RawResource::new(CONFIG_URI, "config");
        config.description = Some("Tool host configuration".to_string());
        config.mime_type = Some(JSON_MIME.to_string());
        let mut resources = vec![config.no_annotation()];

        if self.docs_path.is_file() {
            let mut docs = RawResource::new(self.docs_uri.clone(), "Demo Document");
            docs.mime_type = Some(MARKDOWN_MIME.to_string());
            resources.push(docs.no_annotation());
        }
        resources
    }

    pub async fn read(&self, uri: &str) -> Result<ResourceContents, ResourceError> {
        if uri == CONFIG_URI {
            let text = serde_json::to_string_pretty(&self.config).unwrap_or_else(|_| self.config.to_string());
            return Ok(with_mime(ResourceContents::text(text, uri), JSON_MIME));
        }
        if uri != self.docs_uri {
            return Err(ResourceError::NotFound(uri.to_string()));
        }

        match tokio::fs::read_to_string(&self.docs_path).await {
            Ok(text) => Ok(with_mime(ResourceContents::text(text, uri), MARKDOWN_MIME)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ResourceError::NotFound(uri.to_string())),
            Err(source) => Err(ResourceError::Read {
                path: self.docs_path.clone(),
                source,
            }),
        }
    }
}

fn with_mime(mut contents: ResourceContents, mime: &str) -> ResourceContents {
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(mime.to_string());
    }
    contents
}

/// Body of `data://config`
pub fn config_document(modules: &[&str], data_source: &str) -> Value {
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "modules": modules,
        "providers": ["sqlite"],
        "data_source": data_source,
    })
}
