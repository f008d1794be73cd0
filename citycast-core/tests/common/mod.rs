//! Shared fixtures for screen integration tests.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use citycast_core::{
    ForecastRequest, ForecastSnapshot, LocationCandidate, MemoryPreferenceStore, Screen,
    ScreenSettings, SearchRequest, WeatherProvider,
};

/// Provider that answers from a script and records every request.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    searches: Mutex<Vec<SearchRequest>>,
    forecasts: Mutex<Vec<ForecastRequest>>,
    search_results: Mutex<HashMap<String, Vec<LocationCandidate>>>,
    failing_cities: Mutex<HashSet<String>>,
    forecast_delays: Mutex<HashMap<String, Duration>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer_search(&self, query: &str, candidates: Vec<LocationCandidate>) {
        self.search_results.lock().unwrap().insert(query.to_string(), candidates);
    }

    pub fn fail_forecast(&self, city: &str) {
        self.failing_cities.lock().unwrap().insert(city.to_string());
    }

    pub fn recover_forecast(&self, city: &str) {
        self.failing_cities.lock().unwrap().remove(city);
    }

    pub fn delay_forecast(&self, city: &str, delay: Duration) {
        self.forecast_delays.lock().unwrap().insert(city.to_string(), delay);
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().iter().map(|r| r.city_name.clone()).collect()
    }

    pub fn forecasts(&self) -> Vec<ForecastRequest> {
        self.forecasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn search_locations(
        &self,
        request: &SearchRequest,
    ) -> anyhow::Result<Vec<LocationCandidate>> {
        self.searches.lock().unwrap().push(request.clone());
        let results = self.search_results.lock().unwrap().get(&request.city_name).cloned();
        Ok(results.unwrap_or_default())
    }

    async fn forecast(&self, request: &ForecastRequest) -> anyhow::Result<ForecastSnapshot> {
        self.forecasts.lock().unwrap().push(request.clone());

        let delay = self.forecast_delays.lock().unwrap().get(&request.city_name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_cities.lock().unwrap().contains(&request.city_name) {
            anyhow::bail!("forecast for {} unavailable", request.city_name);
        }

        Ok(snapshot_for(&request.city_name, request.days))
    }
}

pub fn snapshot_for(city: &str, days: u8) -> ForecastSnapshot {
    let forecastday: Vec<_> = (0..days)
        .map(|i| {
            serde_json::json!({
                "date": format!("2026-10-{:02}", 19 + u32::from(i)),
                "day": {"avgtemp_c": 20.0 + f64::from(i), "condition": {"text": "Sunny", "icon": ""}},
                "astro": {"sunrise": "06:45 AM", "sunset": "06:40 PM"}
            })
        })
        .collect();

    serde_json::from_value(serde_json::json!({
        "location": {"name": city, "country": "Testland"},
        "current": {"temp_c": 25.0, "condition": {"text": "Partly cloudy", "icon": ""}, "wind_kph": 11.2, "humidity": 60},
        "forecast": {"forecastday": forecastday}
    }))
    .expect("fixture snapshot is valid")
}

pub fn screen_with(provider: Arc<ScriptedProvider>, store: Arc<MemoryPreferenceStore>) -> Screen {
    Screen::new(provider, store, ScreenSettings::default())
}

/// Keep applying events for `window` of (paused) time.
pub async fn settle(screen: &mut Screen, window: Duration) {
    let _ = tokio::time::timeout(window, screen.wait_for(|_| false)).await;
}

/// Apply events until `done` holds, failing the test after 10s of (paused) time.
pub async fn wait_until<F>(screen: &mut Screen, done: F)
where
    F: FnMut(&citycast_core::ViewState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), screen.wait_for(done))
        .await
        .expect("screen never reached the expected state");
}
