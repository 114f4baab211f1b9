//! Current-weather lookup exposed as a host-framework tool.
//!
//! This crate defines:
//! - The lookup contract (`get_weather`) and its error taxonomy
//! - An extensible registry of weather providers (OpenWeatherMap built in)
//! - An explicit tool-registration API for agent/automation hosts
//! - Optional endpoint configuration (never credentials)
//!
//! It is used by `weather-cli`, but can also be embedded in other hosts.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod tool;

pub use config::{Config, ProviderConfig};
pub use error::{ProviderError, WeatherError};
pub use model::{DEFAULT_PROVIDER, WeatherQuery, WeatherResult};
pub use provider::{ProviderRegistry, WeatherProvider, get_weather};
pub use tool::{ToolError, ToolHandler, ToolMeta, ToolRegistry, WeatherTool, register_weather_tool};
