//! The weather screen: one event loop over the view state.
//!
//! User input, platform signals and finished requests all arrive as
//! [`ViewEvent`]s. Each event goes through [`update`]; the resulting effects
//! start background requests (which report back as further events) or write
//! the remembered city.

use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;

use crate::{
    Config,
    config::{DEFAULT_FALLBACK_CITY, DEFAULT_FORECAST_DAYS, DEFAULT_SEARCH_DEBOUNCE_MS},
    model::LocationCandidate,
    provider::WeatherProvider,
    search::SearchCoordinator,
    session::ForecastSession,
    signals::{PlatformSignal, PlatformSignals, SignalListener},
    store::PreferenceStore,
    view::{Effect, ViewEvent, ViewState, update},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSettings {
    pub fallback_city: String,
    pub forecast_days: u8,
    pub search_debounce: Duration,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            fallback_city: DEFAULT_FALLBACK_CITY.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        }
    }
}

impl From<&Config> for ScreenSettings {
    fn from(config: &Config) -> Self {
        Self {
            fallback_city: config.fallback_city.clone(),
            forecast_days: config.forecast_days,
            search_debounce: config.search_debounce(),
        }
    }
}

#[derive(Debug)]
pub struct Screen {
    state: ViewState,
    events_tx: mpsc::UnboundedSender<ViewEvent>,
    events_rx: mpsc::UnboundedReceiver<ViewEvent>,
    search: SearchCoordinator,
    session: ForecastSession,
    signals: Option<SignalListener>,
    /// Set by the first mount; the startup forecast is loaded once per screen.
    session_started: bool,
}

impl Screen {
    /// Must be called inside a tokio runtime; the search debouncer spawns its
    /// timer task immediately.
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn PreferenceStore>,
        settings: ScreenSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let search = SearchCoordinator::new(
            Arc::clone(&provider),
            settings.search_debounce,
            events_tx.clone(),
        );
        let session =
            ForecastSession::new(provider, store, settings.fallback_city, settings.forecast_days);

        Self {
            state: ViewState::new(),
            events_tx,
            events_rx,
            search,
            session,
            signals: None,
            session_started: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.signals.is_some()
    }

    /// Start listening to platform signals. The first mount also loads the
    /// startup forecast; a remount only resumes event processing.
    pub fn mount(&mut self, signals: &PlatformSignals) {
        if self.is_mounted() {
            return;
        }
        self.signals = Some(signals.listen());

        if !self.session_started {
            self.session_started = true;
            self.session.spawn_load_default(self.events_tx.clone());
        }
    }

    /// Stop listening to platform signals and drop any unsettled query.
    ///
    /// Responses that arrive afterwards stay queued until the next mount.
    pub fn unmount(&mut self) {
        self.signals = None;
        self.search.cancel();
    }

    /// Raw text from the search input; debounced before anything is sent.
    pub fn query_changed(&self, raw_text: &str) {
        self.search.on_query_changed(raw_text);
    }

    pub async fn toggle_search(&mut self) {
        self.dispatch(ViewEvent::SearchToggled).await;
    }

    pub async fn focus_input(&mut self) {
        self.dispatch(ViewEvent::InputFocused).await;
    }

    pub async fn select_candidate(&mut self, candidate: LocationCandidate) {
        self.dispatch(ViewEvent::CandidateSelected(candidate)).await;
    }

    pub async fn retry(&mut self) {
        self.dispatch(ViewEvent::RetryRequested).await;
    }

    /// Apply one event and run the effects it produces.
    pub async fn dispatch(&mut self, event: ViewEvent) {
        tracing::trace!(event = event.kind(), "Dispatching");

        for effect in update(&mut self.state, event) {
            self.run_effect(effect).await;
        }
    }

    async fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::SearchLocations { seq, query } => {
                self.search.spawn_search(seq, query, self.events_tx.clone());
            }
            Effect::CancelPendingSearch => self.search.cancel(),
            Effect::FetchForecast { seq, city_name } => {
                self.session.spawn_fetch(seq, city_name, self.events_tx.clone());
            }
            Effect::PersistCity(city) => self.session.remember_city(&city).await,
        }
    }

    /// Wait for the next queued event or platform signal and apply it.
    ///
    /// While unmounted nothing is applied and this never completes.
    pub async fn next_event(&mut self) {
        if !self.is_mounted() {
            return std::future::pending().await;
        }

        let event = tokio::select! {
            Some(event) = self.events_rx.recv() => event,
            Some(signal) = next_signal(&mut self.signals) => match signal {
                PlatformSignal::KeyboardHidden => ViewEvent::KeyboardHidden,
                PlatformSignal::BackPressed => ViewEvent::BackPressed,
            },
            else => return,
        };

        self.dispatch(event).await;
    }

    /// Process events until `done` holds for the state.
    ///
    /// Never returns if `done` never holds; wrap in `tokio::time::timeout`.
    pub async fn wait_for<F>(&mut self, mut done: F)
    where
        F: FnMut(&ViewState) -> bool,
    {
        while !done(&self.state) {
            self.next_event().await;
        }
    }
}

async fn next_signal(listener: &mut Option<SignalListener>) -> Option<PlatformSignal> {
    match listener {
        Some(listener) => listener.recv().await,
        None => std::future::pending().await,
    }
}
