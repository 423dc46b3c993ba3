//! MCP server exposing the tool modules
//!
//! Each module contributes one tool router, and some add prompts or
//! resources. The composition root picks the modules and the builder merges
//! what they contribute; nothing registers itself.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use rmcp::{
    handler::server::{
        router::{prompt::PromptRouter, tool::ToolRouter},
        wrapper::Parameters,
    },
    model::{
        GetPromptRequestParams, GetPromptResult, Implementation, ListPromptsResult,
        ListResourcesResult, PaginatedRequestParams, PromptMessage,
        PromptMessageRole, PromptsCapability, ReadResourceRequestParams, ReadResourceResult,
        ResourcesCapability, ServerCapabilities, ServerInfo, ToolsCapability,
    },
    prompt, prompt_handler, prompt_router, schemars,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData, RoleServer, ServerHandler,
};
use serde::Deserialize;
use serde_json::json;
use toolchat_core::logging::Logger;

use crate::calculator::{evaluate, to_json_number};
use crate::config::HostConfig;
use crate::data_source::{DataSource, SqliteDataSource, DEFAULT_DATABASE_PATH};
use crate::error::{HostError, HostResult};
use crate::resources::{config_document, ResourceCatalog, ResourceError, DEFAULT_DOCS_PATH};
use crate::weather::{WeatherClient, WeatherSettings};

/// A group of tools that can be mounted on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolModule {
    /// `calculate`
    Calculator,
    /// `weather`
    Weather,
    /// `execute_sqlite` and the `example_prompt` prompt
    Sqlite,
    /// `hello`, `greet`, `multiply`, plus the `data://config` and demo
    /// document resources
    Basics,
}

impl ToolModule {
    pub const ALL: [ToolModule; 4] = [
        ToolModule::Calculator,
        ToolModule::Weather,
        ToolModule::Sqlite,
        ToolModule::Basics,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolModule::Calculator => "calculator",
            ToolModule::Weather => "weather",
            ToolModule::Sqlite => "sqlite",
            ToolModule::Basics => "basics",
        }
    }

    /// Parse a comma-separated list; blanks are skipped, `all` expands
    pub fn parse_list(list: &str) -> HostResult<Vec<ToolModule>> {
        let mut modules = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.eq_ignore_ascii_case("all") {
                modules.extend(Self::ALL);
            } else {
                modules.push(item.parse()?);
            }
        }
        Ok(modules)
    }
}

impl FromStr for ToolModule {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calculator" | "calc" => Ok(ToolModule::Calculator),
            "weather" => Ok(ToolModule::Weather),
            "sqlite" | "sql" => Ok(ToolModule::Sqlite),
            "basics" => Ok(ToolModule::Basics),
            _ => Err(HostError::UnknownModule(s.to_string())),
        }
    }
}

impl std::fmt::Display for ToolModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateRequest {
    #[schemars(description = "Arithmetic expression, e.g. (2 + 3) * sqrt(16)")]
    pub expression: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeatherRequest {
    #[schemars(description = "City name")]
    pub city: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SqlRequest {
    #[schemars(description = "SQL statement to execute")]
    pub sql: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GreetRequest {
    #[schemars(description = "Name of the person to greet")]
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MultiplyRequest {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReviewRequest {
    #[schemars(description = "Code to review")]
    pub code: String,
}

/// The tool host served over MCP
#[derive(Clone)]
pub struct ToolHostServer {
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
    resources: Option<ResourceCatalog>,
    modules: Vec<ToolModule>,
    weather: Arc<WeatherClient>,
    data_source: Arc<dyn DataSource>,
    logger: Arc<dyn Logger>,
}

#[tool_router(router = calculator_router)]
impl ToolHostServer {
    #[tool(
        name = "calculate",
        description = "Evaluate an arithmetic expression. Supports + - * / % ** (or ^), parentheses, \
                       sqrt abs floor ceil round ln log10 sin cos tan exp min max pow, and pi, e."
    )]
    async fn calculate(&self, request: Parameters<CalculateRequest>) -> Result<String, String> {
        let expression = request.0.expression;
        self.logger.info(&format!("[ToolHostServer] calculate: {}", expression));
        match evaluate(&expression) {
            Ok(value) => Ok(json!({ "result": to_json_number(value) }).to_string()),
            Err(e) => {
                self.logger.warn(&format!("[ToolHostServer] calculate failed: {}", e));
                Err(format!("Cannot evaluate '{}': {}", expression, e))
            }
        }
    }
}

#[tool_router(router = weather_router)]
impl ToolHostServer {
    #[tool(name = "weather", description = "Current weather for a given city")]
    async fn weather(&self, request: Parameters<WeatherRequest>) -> String {
        let forecast = self.weather.forecast(&request.0.city).await;
        json!({ "forecast": forecast }).to_string()
    }
}

#[tool_router(router = sqlite_router)]
impl ToolHostServer {
    #[tool(
        name = "execute_sqlite",
        description = "Execute an SQL query on the local SQLite database and return the resulting rows."
    )]
    async fn execute_sqlite(&self, request: Parameters<SqlRequest>) -> Result<String, String> {
        match self.data_source.execute(&request.0.sql).await {
            Ok(rows) => {
                if rows.is_empty() {
                    self.logger.info("[ToolHostServer] execute_sqlite: (no results)");
                }
                Ok(json!({ "rows": rows }).to_string())
            }
            Err(e) => {
                self.logger.error(&format!("[ToolHostServer] execute_sqlite failed: {}", e));
                Err(e.to_string())
            }
        }
    }
}

#[prompt_router(router = "sqlite_prompt_router")]
impl ToolHostServer {
    /// Ask for a review of a code snippet
    #[prompt(name = "example_prompt")]
    async fn example_prompt(&self, request: Parameters<ReviewRequest>) -> Result<Vec<PromptMessage>, ErrorData> {
        Ok(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!("Please review this code:\n\n{}", request.0.code),
        )])
    }
}

#[tool_router(router = basics_router)]
impl ToolHostServer {
    #[tool(name = "hello", description = "Say hi")]
    async fn hello(&self) -> String {
        "hi".to_string()
    }

    #[tool(name = "greet", description = "Greet a user by name")]
    async fn greet(&self, request: Parameters<GreetRequest>) -> String {
        format!("Hello, {}!", request.0.name)
    }

    #[tool(name = "multiply", description = "Multiply two numbers together")]
    async fn multiply(&self, request: Parameters<MultiplyRequest>) -> String {
        to_json_number(request.0.a * request.0.b).to_string()
    }
}

impl ToolHostServer {
    pub fn builder(logger: Arc<dyn Logger>) -> ToolHostServerBuilder {
        ToolHostServerBuilder::new(logger)
    }

    /// Build from resolved settings
    pub fn from_config(config: &HostConfig, logger: Arc<dyn Logger>) -> HostResult<Self> {
        Self::builder(logger)
            .modules(config.modules.iter().copied())
            .weather_settings(config.weather.clone())
            .database_path(config.database_path.clone())
            .docs_path(config.docs_path.clone())
            .build()
    }

    /// Mounted modules, in mount order
    pub fn modules(&self) -> &[ToolModule] {
        &self.modules
    }

    fn router_for(module: ToolModule) -> ToolRouter<Self> {
        match module {
            ToolModule::Calculator => Self::calculator_router(),
            ToolModule::Weather => Self::weather_router(),
            ToolModule::Sqlite => Self::sqlite_router(),
            ToolModule::Basics => Self::basics_router(),
        }
    }

    fn prompt_router_for(module: ToolModule) -> Option<PromptRouter<Self>> {
        match module {
            ToolModule::Sqlite => Some(Self::sqlite_prompt_router()),
            _ => None,
        }
    }
}

#[tool_handler(router = self.tool_router)]
#[prompt_handler(router = self.prompt_router)]
impl ServerHandler for ToolHostServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                prompts: (!self.prompt_router.list_all().is_empty()).then(PromptsCapability::default),
                resources: self.resources.as_ref().map(|_| ResourcesCapability::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "toolchat-host".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "Tool host with modules: {}",
                self.modules.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
            )),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let resources = self.resources.as_ref().map(ResourceCatalog::list).unwrap_or_default();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParams { uri, .. }: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        self.logger.info(&format!("[ToolHostServer] read_resource: {}", uri));
        let Some(catalog) = &self.resources else {
            return Err(ErrorData::resource_not_found(
                format!("Resource not found: {}", uri),
                Some(json!({ "uri": uri })),
            ));
        };
        match catalog.read(&uri).await {
            Ok(contents) => Ok(ReadResourceResult {
                contents: vec![contents],
            }),
            Err(e @ ResourceError::NotFound(_)) => {
                Err(ErrorData::resource_not_found(e.to_string(), Some(json!({ "uri": uri }))))
            }
            Err(e) => {
                self.logger.error(&format!("[ToolHostServer] read_resource failed: {}", e));
                Err(ErrorData::internal_error(e.to_string(), None))
            }
        }
    }
}

/// Collects modules and dependencies for a `ToolHostServer`
pub struct ToolHostServerBuilder {
    logger: Arc<dyn Logger>,
    modules: Vec<ToolModule>,
    weather_settings: WeatherSettings,
    database_path: PathBuf,
    docs_path: PathBuf,
    data_source: Option<Arc<dyn DataSource>>,
}

impl ToolHostServerBuilder {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            modules: Vec::new(),
            weather_settings: WeatherSettings::default(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            docs_path: PathBuf::from(DEFAULT_DOCS_PATH),
            data_source: None,
        }
    }

    pub fn module(mut self, module: ToolModule) -> Self {
        self.modules.push(module);
        self
    }

    pub fn modules(mut self, modules: impl IntoIterator<Item = ToolModule>) -> Self {
        self.modules.extend(modules);
        self
    }

    pub fn weather_settings(mut self, settings: WeatherSettings) -> Self {
        self.weather_settings = settings;
        self
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Markdown document served as a resource by the basics module
    pub fn docs_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.docs_path = path.into();
        self
    }

    /// Use this data source instead of a SQLite file at `database_path`
    pub fn data_source(mut self, data_source: Arc<dyn DataSource>) -> Self {
        self.data_source = Some(data_source);
        self
    }

    pub fn build(self) -> HostResult<ToolHostServer> {
        let mut seen = BTreeSet::new();
        let modules: Vec<ToolModule> = self.modules.into_iter().filter(|m| seen.insert(*m)).collect();
        if modules.is_empty() {
            return Err(HostError::NoModules);
        }

        let mut tool_router = ToolRouter::new();
        let mut prompt_router = PromptRouter::new();
        for module in &modules {
            tool_router.merge(ToolHostServer::router_for(*module));
            if let Some(prompts) = ToolHostServer::prompt_router_for(*module) {
                prompt_router.merge(prompts);
            }
        }

        let weather = Arc::new(WeatherClient::new(self.weather_settings, self.logger.clone())?);
        let data_source = match self.data_source {
            Some(ds) => ds,
            None => Arc::new(SqliteDataSource::new(self.database_path, self.logger.clone())),
        };

        let module_names: Vec<&str> = modules.iter().map(|m| m.name()).collect();
        let resources = modules.contains(&ToolModule::Basics).then(|| {
            ResourceCatalog::new(
                config_document(&module_names, &data_source.describe()),
                self.docs_path,
            )
        });

        self.logger.info(&format!(
            "[ToolHostServer] Mounted modules: {} ({} tools, {} prompts); data source: {}",
            module_names.join(", "),
            tool_router.list_all().len(),
            prompt_router.list_all().len(),
            data_source.describe()
        ));

        Ok(ToolHostServer {
            tool_router,
            prompt_router,
            resources,
            modules,
            weather,
            data_source,
            logger: self.logger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolchat_core::logging::NoOpLogger;

    fn tool_names(server: &ToolHostServer) -> Vec<String> {
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_parse_modules() {
        assert_eq!(
            ToolModule::parse_list("calc, SQL ,,weather").unwrap(),
            vec![ToolModule::Calculator, ToolModule::Sqlite, ToolModule::Weather]
        );
        assert_eq!(ToolModule::parse_list("all").unwrap(), ToolModule::ALL.to_vec());
        assert!(ToolModule::parse_list("calculator,nope").is_err());
    }

    #[test]
    fn test_all_modules_mount_every_tool() {
        let server = ToolHostServer::builder(Arc::new(NoOpLogger))
            .modules(ToolModule::ALL)
            .build()
            .unwrap();
        assert_eq!(
            tool_names(&server),
            vec!["calculate", "execute_sqlite", "greet", "hello", "multiply", "weather"]
        );
    }

    #[test]
    fn test_selected_modules_only() {
        let server = ToolHostServer::builder(Arc::new(NoOpLogger))
            .module(ToolModule::Calculator)
            .module(ToolModule::Calculator)
            .build()
            .unwrap();
        assert_eq!(server.modules(), &[ToolModule::Calculator]);
        assert_eq!(tool_names(&server), vec!["calculate"]);
    }

    #[test]
    fn test_no_modules_rejected() {
        let result = ToolHostServer::builder(Arc::new(NoOpLogger)).build();
        assert!(matches!(result, Err(HostError::NoModules)));
    }

    #[tokio::test]
    async fn test_calculate_tool() {
        let server = ToolHostServer::builder(Arc::new(NoOpLogger))
            .module(ToolModule::Calculator)
            .build()
            .unwrap();

        let ok = server
            .calculate(Parameters(CalculateRequest {
                expression: "2 + 2".into(),
            }))
            .await;
        assert_eq!(ok, Ok(r#"{"result":4}"#.to_string()));

        let err = server
            .calculate(Parameters(CalculateRequest {
                expression: "1/0".into(),
            }))
            .await
            .unwrap_err();
        assert!(err.contains("division by zero"));
    }

    #[tokio::test]
    async fn test_basics_tools() {
        let server = ToolHostServer::builder(Arc::new(NoOpLogger))
            .module(ToolModule::Basics)
            .build()
            .unwrap();

        assert_eq!(server.hello().await, "hi");
        assert_eq!(
            server.greet(Parameters(GreetRequest { name: "Ada".into() })).await,
            "Hello, Ada!"
        );
        assert_eq!(
            server.multiply(Parameters(MultiplyRequest { a: 2.5, b: 4.0 })).await,
            "10"
        );
    }

    #[test]
    fn test_server_info() {
        let server = ToolHostServer::builder(Arc::new(NoOpLogger))
            .modules([ToolModule::Weather, ToolModule::Sqlite])
            .build()
            .unwrap();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "toolchat-host");
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_some());
        assert!(info.capabilities.resources.is_none());
        assert_eq!(info.instructions.as_deref(), Some("Tool host with modules: weather, sqlite"));
    }

    #[test]
    fn test_prompts_and_resources_follow_modules() {
        let calc_only = ToolHostServer::builder(Arc::new(NoOpLogger))
            .module(ToolModule::Calculator)
            .build()
            .unwrap();
        assert!(calc_only.prompt_router.list_all().is_empty());
        assert!(calc_only.resources.is_none());
        assert!(calc_only.get_info().capabilities.prompts.is_none());

        let basics = ToolHostServer::builder(Arc::new(NoOpLogger))
            .module(ToolModule::Basics)
            .build()
            .unwrap();
        assert!(basics.resources.is_some());
        assert!(basics.get_info().capabilities.resources.is_some());

        let sqlite = ToolHostServer::builder(Arc::new(NoOpLogger))
            .module(ToolModule::Sqlite)
            .build()
            .unwrap();
        let prompts: Vec<String> = sqlite
            .prompt_router
            .list_all()
            .into_iter()
            .map(|p| p.name.to_string())
            .collect();
        assert_eq!(prompts, vec!["example_prompt"]);
    }

    #[tokio::test]
    async fn test_example_prompt() {
        let server = ToolHostServer::builder(Arc::new(NoOpLogger))
            .module(ToolModule::Sqlite)
            .build()
            .unwrap();
        let messages = server
            .example_prompt(Parameters(ReviewRequest {
                code: "SELECT 1".into(),
            }))
            .await
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, PromptMessageRole::User);
    }
}
