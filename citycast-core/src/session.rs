use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    model::{ForecastRequest, ForecastSnapshot},
    provider::WeatherProvider,
    store::{CITY_KEY, PreferenceStore},
    view::ViewEvent,
};

/// Fetches forecasts for a city and remembers the user's choice.
#[derive(Debug, Clone)]
pub struct ForecastSession {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn PreferenceStore>,
    fallback_city: String,
    days: u8,
}

impl ForecastSession {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn PreferenceStore>,
        fallback_city: impl Into<String>,
        days: u8,
    ) -> Self {
        Self { provider, store, fallback_city: fallback_city.into(), days }
    }

    /// The remembered city, or the fallback when nothing usable is stored.
    ///
    /// The fallback itself is never written back.
    pub async fn resolve_default_city(&self) -> String {
        match self.store.get(CITY_KEY).await {
            Ok(Some(city)) if !city.trim().is_empty() => city,
            Ok(_) => self.fallback_city.clone(),
            Err(e) => {
                tracing::warn!("Could not read remembered city, using fallback: {e}");
                self.fallback_city.clone()
            }
        }
    }

    /// Resolve the startup city in the background and post it as an event.
    pub fn spawn_load_default(&self, events: UnboundedSender<ViewEvent>) {
        let session = self.clone();

        tokio::spawn(async move {
            let city = session.resolve_default_city().await;
            tracing::info!(%city, "Loading startup forecast");
            let _ = events.send(ViewEvent::DefaultCityResolved(city));
        });
    }

    pub async fn fetch_by_city(&self, name: &str, days: u8) -> anyhow::Result<ForecastSnapshot> {
        let request = ForecastRequest { city_name: name.to_string(), days };
        self.provider.forecast(&request).await
    }

    /// Run one tagged forecast fetch in the background and post its outcome.
    pub fn spawn_fetch(&self, seq: u64, city_name: String, events: UnboundedSender<ViewEvent>) {
        let session = self.clone();

        tokio::spawn(async move {
            tracing::debug!(seq, city = %city_name, days = session.days, "Fetching forecast");

            let event = match session.fetch_by_city(&city_name, session.days).await {
                Ok(snapshot) => ViewEvent::ForecastLoaded { seq, snapshot: Box::new(snapshot) },
                Err(e) => {
                    tracing::warn!(seq, city = %city_name, "Forecast fetch failed: {e:#}");
                    ViewEvent::ForecastFailed { seq, message: format!("{e:#}") }
                }
            };

            let _ = events.send(event);
        });
    }

    pub async fn remember_city(&self, city: &str) {
        match self.store.set(CITY_KEY, city).await {
            Ok(()) => tracing::info!(%city, "Remembered city"),
            Err(e) => tracing::warn!(%city, "Could not remember city: {e}"),
        }
    }
}
