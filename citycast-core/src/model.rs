use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::art::ConditionArt;

/// Location search query, keyed by free-form city text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub city_name: String,
}

/// Forecast query for a single city over `days` daily entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub city_name: String,
    pub days: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One entry of the location search dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub country: String,
    pub region: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl LocationCandidate {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self { name: name.into(), country: country.into(), region: None, coordinates: None }
    }

    /// Dropdown label, e.g. `"London, United Kingdom"`.
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    #[serde(default)]
    pub icon: String,
}

impl Condition {
    pub fn art(&self) -> ConditionArt {
        ConditionArt::from_condition_text(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLocation {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub avgtemp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub day: DaySummary,
    pub astro: Astro,
}

impl DailyForecast {
    /// Short weekday name for the forecast strip ("Mon", "Tue", ...).
    pub fn weekday_label(&self) -> String {
        self.date.format("%a").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecastday: Vec<DailyForecast>,
}

/// Current conditions plus the multi-day forecast for one city, kept in the
/// provider's own shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub location: ForecastLocation,
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

impl ForecastSnapshot {
    pub fn sunrise_today(&self) -> Option<&str> {
        self.forecast.forecastday.first().map(|d| d.astro.sunrise.as_str())
    }

    pub fn days(&self) -> &[DailyForecast] {
        &self.forecast.forecastday
    }
}
