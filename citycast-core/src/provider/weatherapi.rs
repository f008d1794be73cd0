use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{
    Coordinates, ForecastRequest, ForecastSnapshot, LocationCandidate, SearchRequest,
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    /// `base_url` is the API root, e.g. `https://api.weatherapi.com/v1` or a mock server.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn get_body(&self, what: &str, url: &str, query: &[(&str, &str)]) -> Result<String> {
        tracing::debug!(endpoint = %url, "WeatherAPI {what} request");

        let res = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "WeatherAPI {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct WaSearchEntry {
    name: String,
    country: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl From<WaSearchEntry> for LocationCandidate {
    fn from(entry: WaSearchEntry) -> Self {
        let coordinates = match (entry.lat, entry.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        };

        LocationCandidate {
            name: entry.name,
            country: entry.country,
            region: entry.region.filter(|r| !r.is_empty()),
            coordinates,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn search_locations(&self, request: &SearchRequest) -> Result<Vec<LocationCandidate>> {
        let url = self.endpoint("search.json");
        let body = self.get_body("search", &url, &[("q", request.city_name.as_str())]).await?;

        let parsed: Vec<WaSearchEntry> =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI search JSON")?;

        Ok(parsed.into_iter().map(LocationCandidate::from).collect())
    }

    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastSnapshot> {
        let url = self.endpoint("forecast.json");
        let days = request.days.to_string();
        let body = self
            .get_body(
                "forecast",
                &url,
                &[("q", request.city_name.as_str()), ("days", days.as_str())],
            )
            .await?;

        serde_json::from_str(&body).context("Failed to parse WeatherAPI forecast JSON")
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
