use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, CustomUserError, Select, Text, validator::Validation};
use tracing::debug;
use weather_tool::{
    Config, ProviderConfig, ToolRegistry, WeatherQuery, WeatherResult, register_weather_tool,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather lookup tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Mumbai" or "Mumbai,IN".
        city: String,

        /// Provider identifier; defaults to the configured one.
        #[arg(long)]
        provider: Option<String>,

        /// API key for the provider.
        #[arg(long, default_value = "")]
        api_key: String,

        /// Print the full JSON result instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// List supported providers.
    Providers,

    /// List registered tools with their input schemas.
    Tools,

    /// Invoke a registered tool by name with JSON arguments.
    Call {
        /// Tool name, e.g. "weather".
        tool: String,

        /// Arguments as a JSON object.
        args: String,
    },

    /// Configure the default provider and endpoint overrides.
    Configure {
        /// Provider to configure; prompts when omitted.
        provider: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = Config::config_file_path()?;
        let config = Config::load_from(&path)?;
        debug!(
            path = %path.display(),
            default_provider = config.default_provider_name(),
            "loaded configuration"
        );

        match self.command {
            Command::Show { city, provider, api_key, json } => {
                let provider =
                    provider.unwrap_or_else(|| config.default_provider_name().to_string());
                let query = WeatherQuery::new(city).with_provider(provider).with_api_key(api_key);

                let result = config.provider_registry().get_weather(&query).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!("{}", summary(&result));
                }
            }
            Command::Providers => {
                for name in config.provider_registry().names() {
                    println!("{name}");
                }
            }
            Command::Tools => {
                for meta in build_tools(&config)?.list() {
                    println!("{} - {}", meta.name, meta.description);
                    println!("{}", serde_json::to_string_pretty(&meta.input_schema)?);
                }
            }
            Command::Call { tool, args } => {
                let args: serde_json::Value =
                    serde_json::from_str(&args).context("Tool arguments must be valid JSON")?;
                let out = build_tools(&config)?.call(&tool, args).await?;
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Command::Configure { provider } => configure(config, provider)?,
        }

        Ok(())
    }
}

fn build_tools(config: &Config) -> Result<ToolRegistry> {
    let mut tools = ToolRegistry::new();
    register_weather_tool(&mut tools, config.provider_registry())?;
    Ok(tools)
}

fn configure(mut config: Config, provider: Option<String>) -> Result<()> {
    let registry = config.provider_registry();
    let names: Vec<String> = registry.names().into_iter().map(str::to_string).collect();

    let provider = match provider {
        Some(p) => p.to_lowercase(),
        None => Select::new("Provider to configure:", names).prompt()?,
    };
    if !registry.contains(&provider) {
        bail!(
            "Unknown provider '{provider}'. Supported providers: {}.",
            registry.names().join(", ")
        );
    }

    let current = config.provider_config(&provider).cloned().unwrap_or_default();

    let base_url = Text::new("Base URL (leave empty for the provider default):")
        .with_default(current.base_url.as_deref().unwrap_or(""))
        .prompt()?;
    let timeout_secs = CustomType::<u64>::new("Request timeout in seconds:")
        .with_default(current.timeout_secs.filter(|s| *s > 0).unwrap_or(10))
        .with_validator(|secs: &u64| {
            Ok::<_, CustomUserError>(if *secs == 0 {
                Validation::Invalid("Timeout must be at least one second".into())
            } else {
                Validation::Valid
            })
        })
        .prompt()?;

    config.upsert_provider(
        &provider,
        ProviderConfig {
            base_url: Some(base_url.trim().to_string()).filter(|s| !s.is_empty()),
            timeout_secs: Some(timeout_secs),
        },
    );

    if Confirm::new(&format!("Use '{provider}' as the default provider?"))
        .with_default(true)
        .prompt()?
    {
        config.set_default_provider(&provider);
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn summary(result: &WeatherResult) -> String {
    let temperature = result
        .temperature_c
        .as_ref()
        .map(|t| format!("{t} °C"))
        .unwrap_or_else(|| "n/a".to_string());
    let humidity = result
        .humidity
        .as_ref()
        .map(|h| format!("{h}%"))
        .unwrap_or_else(|| "n/a".to_string());
    let condition = if result.condition.is_empty() { "n/a" } else { &result.condition };

    format!("{}: {temperature}, humidity {humidity}, {condition}", result.city)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(temp: Option<f64>, humidity: Option<u64>, condition: &str) -> WeatherResult {
        WeatherResult {
            city: "Mumbai".into(),
            temperature_c: temp.and_then(serde_json::Number::from_f64),
            humidity: humidity.map(serde_json::Number::from),
            condition: condition.into(),
            raw: json!({}),
        }
    }

    #[test]
    fn summary_formats_all_fields() {
        let s = summary(&result(Some(21.5), Some(60), "clear sky"));
        assert_eq!(s, "Mumbai: 21.5 °C, humidity 60%, clear sky");
    }

    #[test]
    fn summary_marks_absent_fields() {
        let s = summary(&result(None, None, ""));
        assert_eq!(s, "Mumbai: n/a, humidity n/a, n/a");
    }

    #[test]
    fn cli_parses_show_with_defaults() {
        let cli = Cli::parse_from(["weather", "show", "Oslo"]);
        match cli.command {
            Command::Show { city, provider, api_key, json } => {
                assert_eq!(city, "Oslo");
                assert!(provider.is_none());
                assert!(api_key.is_empty());
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn build_tools_registers_weather() {
        let tools = build_tools(&Config::default()).unwrap();
        let names: Vec<String> = tools.list().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["weather"]);
    }
}
