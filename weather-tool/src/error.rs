use thiserror::Error;

/// Everything a weather lookup can fail with. Nothing is retried.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Unsupported weather provider: {0}")]
    UnsupportedProvider(String),

    #[error("Provider '{0}' requires an `api_key` argument")]
    MissingCredential(String),

    #[error("Invalid weather query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No HTTP response was received at all (DNS, connect, timeout).
    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
}

impl WeatherError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WeatherError::Transport { source, .. } if source.is_timeout())
    }
}

/// The provider answered, but not with something usable.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Weather API error ({provider}): {status} {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// The response arrived but its body could not be read.
    #[error("Failed to read {provider} response body (status {status}): {source}")]
    Body {
        provider: String,
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode {provider} response: {source}")]
    Decode {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode {provider} response: expected a JSON object")]
    NotAnObject { provider: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_code_and_body() {
        let err = WeatherError::from(ProviderError::Status {
            provider: "openweathermap".into(),
            status: 404,
            body: "city not found".into(),
        });
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("city not found"));
    }

    #[test]
    fn unsupported_provider_names_offender() {
        let err = WeatherError::UnsupportedProvider("weatherapi".into());
        assert_eq!(err.to_string(), "Unsupported weather provider: weatherapi");
        assert!(!err.is_timeout());
    }
}
