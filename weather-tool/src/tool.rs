//! Explicit tool registration for host frameworks.
//!
//! A host builds a [`ToolRegistry`], registers handlers under a name with a
//! JSON-Schema for their arguments, then lists or invokes them by name.

use std::{collections::BTreeMap, fmt, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{DEFAULT_PROVIDER, ProviderRegistry, WeatherError, WeatherQuery};

/// Name the weather lookup is registered under.
pub const WEATHER_TOOL_NAME: &str = "weather";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error("Failed to serialize tool output: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Callable side of a tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> Result<Value, ToolError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolMeta {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Clone)]
struct RegisteredTool {
    meta: ToolMeta,
    handler: Arc<dyn ToolHandler>,
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    by_name: BTreeMap<String, RegisteredTool>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), ToolError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }

        let meta = ToolMeta {
            name: name.clone(),
            description: description.into(),
            input_schema,
        };
        self.by_name.insert(name, RegisteredTool { meta, handler });
        Ok(())
    }

    /// Registered tools, sorted by name.
    pub fn list(&self) -> Vec<ToolMeta> {
        self.by_name.values().map(|t| t.meta.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolMeta> {
        self.by_name.get(name).map(|t| &t.meta)
    }

    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = self
            .by_name
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tracing::debug!(tool = name, "calling tool");
        tool.handler.call(arguments).await
    }
}

/// Tool handler wrapping a [`ProviderRegistry`].
#[derive(Debug, Clone, Default)]
pub struct WeatherTool {
    providers: ProviderRegistry,
}

impl WeatherTool {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self { providers }
    }

    pub fn description() -> &'static str {
        "Get current weather for a city. Returns temperature (C), humidity (%), \
         condition text and the raw provider response."
    }

    pub fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name, e.g. \"Mumbai\" or \"Mumbai,IN\""
                },
                "provider": {
                    "type": "string",
                    "description": "Weather provider identifier (case-insensitive)",
                    "enum": self.providers.names(),
                    "default": DEFAULT_PROVIDER
                },
                "api_key": {
                    "type": "string",
                    "description": "API key for the provider, if it requires one",
                    "default": ""
                }
            },
            "required": ["city"]
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WeatherArgs {
    city: String,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
}

#[async_trait]
impl ToolHandler for WeatherTool {
    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: WeatherArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let mut query = WeatherQuery::new(args.city);
        if let Some(provider) = args.provider {
            query = query.with_provider(provider);
        }
        if let Some(api_key) = args.api_key {
            query = query.with_api_key(api_key);
        }

        let result = self.providers.get_weather(&query).await?;
        serde_json::to_value(result).map_err(ToolError::Serialize)
    }
}

/// Register the weather lookup under [`WEATHER_TOOL_NAME`].
pub fn register_weather_tool(
    registry: &mut ToolRegistry,
    providers: ProviderRegistry,
) -> Result<(), ToolError> {
    let tool = WeatherTool::new(providers);
    let schema = tool.input_schema();
    registry.register(WEATHER_TOOL_NAME, WeatherTool::description(), schema, Arc::new(tool))
}
