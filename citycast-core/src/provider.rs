use crate::{
    Config,
    model::{ForecastRequest, ForecastSnapshot, LocationCandidate, SearchRequest},
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

/// Remote weather data source: city search plus multi-day forecast.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn search_locations(
        &self,
        request: &SearchRequest,
    ) -> anyhow::Result<Vec<LocationCandidate>>;

    async fn forecast(&self, request: &ForecastRequest) -> anyhow::Result<ForecastSnapshot>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;

    let provider: Arc<dyn WeatherProvider> =
        Arc::new(WeatherApiProvider::with_base_url(api_key.to_owned(), &config.base_url));

    Ok(provider)
}
