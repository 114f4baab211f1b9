use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::{ProviderError, WeatherError, WeatherResult};

use super::WeatherProvider;

const NAME: &str = "openweathermap";
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Current-weather adapter for api.openweathermap.org, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    endpoint: String,
    timeout: Duration,
    http: Client,
}

impl OpenWeatherMapProvider {
    pub fn new() -> Self {
        Self {
            endpoint: endpoint_for(DEFAULT_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
            http: Client::new(),
        }
    }

    /// Point the adapter at another host, e.g. a proxy or a test server.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.endpoint = endpoint_for(base_url.as_ref());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_current(&self, city: &str, api_key: &str) -> Result<Value, WeatherError> {
        debug!(endpoint = %self.endpoint, city, "requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ProviderError::Body {
            provider: NAME.to_string(),
            status: status.as_u16(),
            source: source.without_url(),
        })?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), city, "OpenWeatherMap returned an error status");
            return Err(ProviderError::Status {
                provider: NAME.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|source| {
            WeatherError::from(ProviderError::Decode {
                provider: NAME.to_string(),
                source,
            })
        })
    }
}

impl Default for OpenWeatherMapProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn endpoint_for(base_url: &str) -> String {
    format!("{}{CURRENT_WEATHER_PATH}", base_url.trim_end_matches('/'))
}

// The request URL carries `appid`, so it must not end up in error text.
fn transport(source: reqwest::Error) -> WeatherError {
    WeatherError::Transport {
        provider: NAME.to_string(),
        source: source.without_url(),
    }
}

// Every field is optional. Leaf values of the wrong type count as absent;
// sections of the wrong type are a decode error.

#[derive(Debug, Default, Deserialize)]
struct OwmCurrent {
    #[serde(default)]
    main: Option<OwmMain>,
    #[serde(default)]
    weather: Option<Vec<OwmWeather>>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmMain {
    #[serde(default, deserialize_with = "lenient_number")]
    temp: Option<Number>,
    #[serde(default, deserialize_with = "lenient_number")]
    humidity: Option<Number>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWeather {
    #[serde(default, deserialize_with = "lenient_string")]
    description: Option<String>,
}

fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Number>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => Some(n),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Flatten a decoded current-weather payload into a [`WeatherResult`].
fn normalize(city: &str, raw: Value) -> Result<WeatherResult, WeatherError> {
    if !raw.is_object() {
        return Err(ProviderError::NotAnObject {
            provider: NAME.to_string(),
        }
        .into());
    }

    let parsed = OwmCurrent::deserialize(&raw).map_err(|source| ProviderError::Decode {
        provider: NAME.to_string(),
        source,
    })?;

    let main = parsed.main.unwrap_or_default();
    let condition = parsed
        .weather
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|w| w.description)
        .unwrap_or_default();

    Ok(WeatherResult {
        city: city.to_string(),
        temperature_c: main.temp,
        humidity: main.humidity,
        condition,
        raw,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, city: &str, api_key: &str) -> Result<WeatherResult, WeatherError> {
        let raw = self.fetch_current(city, api_key).await?;
        normalize(city, raw)
    }
}
