use std::{sync::Arc, time::Duration};

use anyhow::Context;
use citycast_core::{
    Config, FilePreferenceStore, LocationCandidate, PlatformSignals, Screen, ScreenSettings,
    SearchRequest, provider_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{CustomUserError, Password, Select, Text, validator::Validation};

use crate::render;

/// How long the CLI waits on any single search or forecast.
const RESPONSE_WAIT: Duration = Duration::from_secs(30);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and the startup city.
    Configure,

    /// Show the forecast for the remembered city (or the fallback city).
    Show {
        /// Show this city instead; it is not remembered.
        #[arg(long)]
        city: Option<String>,
    },

    /// List cities matching a name.
    Search {
        /// City name, at least three characters.
        query: String,
    },

    /// Search, pick a city and view its forecast interactively.
    Browse,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(city).await,
            Command::Search { query } => search(&query).await,
            Command::Browse => browse().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_help_message("Get a free key at https://www.weatherapi.com/")
        .prompt()?;
    config.set_api_key(api_key);

    let fallback_city = Text::new("City to show when none is remembered:")
        .with_default(&config.fallback_city)
        .prompt()?;
    config.fallback_city = fallback_city;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: Option<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    if let Some(city) = city {
        let request =
            citycast_core::ForecastRequest { city_name: city, days: config.forecast_days };
        let snapshot = provider.forecast(&request).await?;
        print!("{}", render::forecast(&snapshot, true));
        return Ok(());
    }

    let store = Arc::new(FilePreferenceStore::open_default()?);
    tracing::debug!(path = %store.path().display(), "Using preferences file");
    let signals = PlatformSignals::new();
    let mut screen = Screen::new(provider, store, ScreenSettings::from(&config));

    screen.mount(&signals);
    wait(&mut screen, |s| !s.flags.loading).await?;
    screen.unmount();

    print!("{}", render::screen(screen.state()));
    Ok(())
}

async fn search(query: &str) -> anyhow::Result<()> {
    if !citycast_core::search::is_searchable(query) {
        anyhow::bail!(
            "Search needs at least {} characters.",
            citycast_core::search::MIN_QUERY_CHARS
        );
    }

    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let candidates =
        provider.search_locations(&SearchRequest { city_name: query.to_string() }).await?;

    if candidates.is_empty() {
        println!("No matching cities.");
    }
    for candidate in &candidates {
        println!("{}", render::candidate(candidate));
    }
    Ok(())
}

/// Dropdown entry for `inquire::Select`.
struct Choice(LocationCandidate);

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render::candidate(&self.0))
    }
}

async fn browse() -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let store = Arc::new(FilePreferenceStore::open_default()?);
    tracing::debug!(path = %store.path().display(), "Using preferences file");
    let signals = PlatformSignals::new();
    let mut screen = Screen::new(provider, store, ScreenSettings::from(&config));

    screen.mount(&signals);
    wait(&mut screen, |s| !s.flags.loading).await?;
    print!("{}", render::screen(screen.state()));

    let min_chars = citycast_core::search::MIN_QUERY_CHARS;

    loop {
        if screen.state().can_retry()
            && inquire::Confirm::new("Loading failed. Retry?").with_default(true).prompt()?
        {
            screen.retry().await;
            wait(&mut screen, |s| !s.flags.loading).await?;
            print!("{}", render::screen(screen.state()));
            continue;
        }

        if !screen.state().flags.search_open {
            screen.toggle_search().await;
        }
        screen.focus_input().await;

        let query = Text::new("Search City:")
            .with_help_message("empty input quits")
            .with_validator(move |input: &str| -> Result<Validation, CustomUserError> {
                if input.is_empty() || citycast_core::search::is_searchable(input) {
                    Ok(Validation::Valid)
                } else {
                    Ok(Validation::Invalid(format!("Type at least {min_chars} characters").into()))
                }
            })
            .prompt()?;
        // The prompt has returned, so the keyboard is gone.
        signals.emit(citycast_core::PlatformSignal::KeyboardHidden);

        if query.is_empty() {
            break;
        }

        let answered = screen.state().search_responses();
        screen.query_changed(&query);
        wait(&mut screen, |s| s.search_responses() > answered).await?;

        if !screen.state().dropdown_visible() {
            match &screen.state().last_error {
                Some(err) => println!("Search failed: {err}"),
                None => println!("No matching cities."),
            }
            continue;
        }

        let choices: Vec<Choice> =
            screen.state().candidates.iter().cloned().map(Choice).collect();
        let Choice(candidate) = Select::new("Pick a city:", choices).prompt()?;

        screen.select_candidate(candidate).await;
        wait(&mut screen, |s| !s.flags.loading).await?;
        print!("{}", render::screen(screen.state()));
    }

    screen.unmount();
    Ok(())
}

async fn wait<F>(screen: &mut Screen, done: F) -> anyhow::Result<()>
where
    F: FnMut(&citycast_core::ViewState) -> bool,
{
    tokio::time::timeout(RESPONSE_WAIT, screen.wait_for(done))
        .await
        .context("Timed out waiting for the weather service")
}
