//! Core library for the `citycast` weather screen.
//!
//! This crate defines:
//! - Configuration and remembered preferences
//! - Abstraction over the weather provider (city search + forecast)
//! - The screen's view state, its pure transition function and the runtime
//!   that drives it (debounced search, forecast session, platform signals)
//!
//! It is used by `citycast-cli`, but any front end can drive a [`Screen`].

pub mod art;
pub mod config;
pub mod debounce;
pub mod model;
pub mod provider;
pub mod screen;
pub mod search;
pub mod session;
pub mod signals;
pub mod store;
pub mod view;

pub use art::ConditionArt;
pub use config::Config;
pub use model::{
    DailyForecast, ForecastRequest, ForecastSnapshot, LocationCandidate, SearchRequest,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use screen::{Screen, ScreenSettings};
pub use signals::{PlatformSignal, PlatformSignals};
pub use store::{CITY_KEY, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use view::{ViewFlags, ViewState};
