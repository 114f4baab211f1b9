use crate::{
    WeatherError, WeatherQuery, WeatherResult, provider::openweathermap::OpenWeatherMapProvider,
};
use async_trait::async_trait;
use std::{collections::HashMap, fmt::Debug, sync::Arc};
use tracing::debug;

pub mod openweathermap;

/// Adapter for one external weather source.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Lowercase identifier the provider is registered under.
    fn name(&self) -> &'static str;

    /// Whether `fetch` needs a non-empty credential.
    fn requires_api_key(&self) -> bool {
        true
    }

    async fn fetch(&self, city: &str, api_key: &str) -> Result<WeatherResult, WeatherError>;
}

/// Provider name -> adapter. Adding a provider never touches dispatch.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    by_name: HashMap<String, Arc<dyn WeatherProvider>>,
}

impl ProviderRegistry {
    /// Empty registry; every lookup fails with `UnsupportedProvider`.
    pub fn new() -> Self {
        Self { by_name: HashMap::new() }
    }

    /// Register `provider`, replacing any adapter with the same name.
    pub fn register<P: WeatherProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.register_arc(Arc::new(provider))
    }

    pub fn register_arc(&mut self, provider: Arc<dyn WeatherProvider>) -> &mut Self {
        self.by_name.insert(provider.name().to_lowercase(), provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn WeatherProvider>> {
        self.by_name.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate the query and dispatch it to the matching adapter.
    ///
    /// Provider, credential and city are all checked before any network
    /// access happens.
    pub async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        let provider_name = query.provider.to_lowercase();

        let provider = self
            .by_name
            .get(&provider_name)
            .ok_or_else(|| WeatherError::UnsupportedProvider(query.provider.clone()))?;

        if provider.requires_api_key() && query.api_key.is_empty() {
            return Err(WeatherError::MissingCredential(provider_name));
        }

        if query.city.is_empty() {
            return Err(WeatherError::InvalidQuery("city must not be empty".to_string()));
        }

        debug!(provider = %provider_name, city = %query.city, "dispatching weather lookup");
        provider.fetch(&query.city, &query.api_key).await
    }
}

impl Default for ProviderRegistry {
    /// Registry with every built-in provider at its default settings.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(OpenWeatherMapProvider::new());
        registry
    }
}

/// Look up current weather for `city` using the built-in providers.
///
/// `provider` is matched case-insensitively; pass [`crate::DEFAULT_PROVIDER`]
/// for the usual behavior.
pub async fn get_weather(
    city: &str,
    provider: &str,
    api_key: &str,
) -> Result<WeatherResult, WeatherError> {
    let query = WeatherQuery::new(city)
        .with_provider(provider)
        .with_api_key(api_key);
    ProviderRegistry::default().get_weather(&query).await
}
