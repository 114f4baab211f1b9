use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Provider used when the caller does not name one.
pub const DEFAULT_PROVIDER: &str = "openweathermap";

/// A single lookup request. Lives for the duration of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherQuery {
    /// City name, optionally with a country code ("London" or "London,GB").
    pub city: String,

    /// Provider identifier, compared case-insensitively.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Credential for providers that require one. Empty means "not supplied".
    #[serde(default)]
    pub api_key: String,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            provider: default_provider(),
            api_key: String::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

/// Normalized weather summary plus the provider's full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    /// Echo of the requested city.
    pub city: String,
    /// Passed through as the provider sent it, so `60` stays an integer.
    pub temperature_c: Option<Number>,
    /// Relative humidity in percent.
    pub humidity: Option<Number>,
    /// Free-text condition, empty when the provider gave none.
    pub condition: String,
    /// Full decoded provider response.
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_defaults_to_openweathermap_without_key() {
        let q = WeatherQuery::new("Mumbai,IN");
        assert_eq!(q.provider, "openweathermap");
        assert!(q.api_key.is_empty());
    }

    #[test]
    fn query_deserializes_with_defaults() {
        let q: WeatherQuery = serde_json::from_value(json!({ "city": "Oslo" })).unwrap();
        assert_eq!(q, WeatherQuery::new("Oslo"));
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let res = WeatherResult {
            city: "Oslo".into(),
            temperature_c: None,
            humidity: None,
            condition: String::new(),
            raw: json!({}),
        };
        let v = serde_json::to_value(&res).unwrap();
        assert!(v["temperature_c"].is_null());
        assert!(v["humidity"].is_null());
        assert_eq!(v["condition"], "");
    }

    #[test]
    fn whole_numbers_stay_integers_in_json() {
        let res = WeatherResult {
            city: "Oslo".into(),
            temperature_c: Number::from_f64(21.5),
            humidity: Some(Number::from(60u64)),
            condition: "clear sky".into(),
            raw: json!({}),
        };
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["humidity"], json!(60));
        assert_eq!(v["temperature_c"], json!(21.5));
    }
}
