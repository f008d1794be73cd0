//! Screen state and its transition function.
//!
//! [`update`] applies one [`ViewEvent`] to a [`ViewState`] and returns the
//! [`Effect`]s the runtime should carry out. It performs no I/O, so every
//! transition can be exercised without a provider, a store or a timer.

use crate::{
    model::{ForecastSnapshot, LocationCandidate},
    search::is_searchable,
};

/// Flags that decide what the screen renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    pub loading: bool,
    pub search_open: bool,
    pub input_focused: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        // The screen starts on the spinner until the first forecast lands.
        Self { loading: true, search_open: false, input_focused: false }
    }
}

/// Why a forecast was requested. Only user selections are remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastOrigin {
    Default,
    Selection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ForecastTicket {
    seq: u64,
    city: String,
    origin: ForecastOrigin,
}

/// Monotonic request tags; only the latest issued tag is honoured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RequestSeq {
    latest: u64,
}

impl RequestSeq {
    fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Outstanding tags become stale without issuing a new request.
    fn invalidate(&mut self) {
        self.latest += 1;
    }

    fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub flags: ViewFlags,
    pub candidates: Vec<LocationCandidate>,
    pub forecast: Option<ForecastSnapshot>,
    pub last_error: Option<String>,
    search_seq: RequestSeq,
    search_responses: u64,
    forecast_seq: RequestSeq,
    in_flight: Option<ForecastTicket>,
    failed: Option<ForecastTicket>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The candidate dropdown shows only while the panel is open and has entries.
    pub fn dropdown_visible(&self) -> bool {
        self.flags.search_open && !self.candidates.is_empty()
    }

    /// The large condition artwork is hidden while typing.
    pub fn shows_condition_art(&self) -> bool {
        !self.flags.input_focused
    }

    pub fn can_retry(&self) -> bool {
        self.failed.is_some()
    }

    /// City of the forecast request currently awaited, if any.
    pub fn pending_city(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|t| t.city.as_str())
    }

    /// Number of search responses (successful or not) applied so far.
    pub fn search_responses(&self) -> u64 {
        self.search_responses
    }

    fn begin_forecast(&mut self, city: String, origin: ForecastOrigin) -> Effect {
        let seq = self.forecast_seq.issue();
        self.in_flight = Some(ForecastTicket { seq, city: city.clone(), origin });
        self.failed = None;
        self.flags.loading = true;
        Effect::FetchForecast { seq, city_name: city }
    }

    fn take_ticket(&mut self, seq: u64) -> Option<ForecastTicket> {
        match &self.in_flight {
            Some(ticket) if ticket.seq == seq && self.forecast_seq.is_latest(seq) => {
                self.in_flight.take()
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// The startup city is known (remembered or fallback).
    DefaultCityResolved(String),
    SearchToggled,
    InputFocused,
    KeyboardHidden,
    BackPressed,
    /// Query text after the debounce window went quiet.
    QuerySettled(String),
    CandidatesLoaded { seq: u64, candidates: Vec<LocationCandidate> },
    SearchFailed { seq: u64, message: String },
    CandidateSelected(LocationCandidate),
    ForecastLoaded { seq: u64, snapshot: Box<ForecastSnapshot> },
    ForecastFailed { seq: u64, message: String },
    RetryRequested,
}

impl ViewEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DefaultCityResolved(_) => "default_city_resolved",
            Self::SearchToggled => "search_toggled",
            Self::InputFocused => "input_focused",
            Self::KeyboardHidden => "keyboard_hidden",
            Self::BackPressed => "back_pressed",
            Self::QuerySettled(_) => "query_settled",
            Self::CandidatesLoaded { .. } => "candidates_loaded",
            Self::SearchFailed { .. } => "search_failed",
            Self::CandidateSelected(_) => "candidate_selected",
            Self::ForecastLoaded { .. } => "forecast_loaded",
            Self::ForecastFailed { .. } => "forecast_failed",
            Self::RetryRequested => "retry_requested",
        }
    }
}

/// Work requested by a transition, tagged so late responses can be matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SearchLocations { seq: u64, query: String },
    /// Drop any query still waiting out the debounce window.
    CancelPendingSearch,
    FetchForecast { seq: u64, city_name: String },
    PersistCity(String),
}

/// Apply `event` to `state`, returning the effects to run.
pub fn update(state: &mut ViewState, event: ViewEvent) -> Vec<Effect> {
    match event {
        ViewEvent::DefaultCityResolved(city) => {
            vec![state.begin_forecast(city, ForecastOrigin::Default)]
        }

        ViewEvent::SearchToggled => {
            state.flags.search_open = !state.flags.search_open;
            if state.flags.search_open {
                return Vec::new();
            }
            state.candidates.clear();
            state.search_seq.invalidate();
            vec![Effect::CancelPendingSearch]
        }

        ViewEvent::InputFocused => {
            state.flags.input_focused = true;
            Vec::new()
        }

        // Back is observed, never consumed.
        ViewEvent::KeyboardHidden | ViewEvent::BackPressed => {
            state.flags.input_focused = false;
            Vec::new()
        }

        ViewEvent::QuerySettled(query) => {
            if !state.flags.search_open {
                tracing::debug!("Ignoring query settled while the search panel is closed");
                return Vec::new();
            }
            if !is_searchable(&query) {
                return Vec::new();
            }
            let seq = state.search_seq.issue();
            vec![Effect::SearchLocations { seq, query }]
        }

        ViewEvent::CandidatesLoaded { seq, candidates } => {
            if !state.search_seq.is_latest(seq) {
                tracing::debug!(seq, "Discarding stale search response");
                return Vec::new();
            }
            state.search_responses += 1;
            state.candidates = candidates;
            // A forecast still in flight keeps the spinner.
            if state.in_flight.is_none() {
                state.flags.loading = false;
            }
            state.last_error = None;
            Vec::new()
        }

        ViewEvent::SearchFailed { seq, message } => {
            if !state.search_seq.is_latest(seq) {
                return Vec::new();
            }
            state.search_responses += 1;
            state.last_error = Some(message);
            Vec::new()
        }

        ViewEvent::CandidateSelected(candidate) => {
            state.candidates.clear();
            state.search_seq.invalidate();
            state.flags.search_open = false;
            vec![
                Effect::CancelPendingSearch,
                state.begin_forecast(candidate.name, ForecastOrigin::Selection),
            ]
        }

        ViewEvent::ForecastLoaded { seq, snapshot } => {
            let Some(ticket) = state.take_ticket(seq) else {
                tracing::debug!(seq, "Discarding stale forecast response");
                return Vec::new();
            };

            state.forecast = Some(*snapshot);
            state.flags.loading = false;
            state.last_error = None;

            match ticket.origin {
                ForecastOrigin::Selection => {
                    state.flags.input_focused = false;
                    vec![Effect::PersistCity(ticket.city)]
                }
                ForecastOrigin::Default => Vec::new(),
            }
        }

        ViewEvent::ForecastFailed { seq, message } => {
            let Some(ticket) = state.take_ticket(seq) else {
                return Vec::new();
            };

            state.flags.loading = false;
            state.last_error = Some(message);
            state.failed = Some(ticket);
            Vec::new()
        }

        ViewEvent::RetryRequested => match state.failed.take() {
            Some(ticket) => {
                state.last_error = None;
                vec![state.begin_forecast(ticket.city, ticket.origin)]
            }
            None => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, CurrentConditions, Forecast, ForecastLocation};

    fn snapshot(city: &str) -> Box<ForecastSnapshot> {
        Box::new(ForecastSnapshot {
            location: ForecastLocation {
                name: city.to_string(),
                country: "Somewhere".to_string(),
                region: None,
                lat: None,
                lon: None,
                localtime: None,
            },
            current: CurrentConditions {
                temp_c: 20.0,
                condition: Condition { text: "Sunny".into(), icon: String::new() },
                wind_kph: 5.0,
                humidity: 40,
            },
            forecast: Forecast { forecastday: Vec::new() },
        })
    }

    fn forecast_seq(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::FetchForecast { seq, .. } => Some(*seq),
                _ => None,
            })
            .unwrap_or_else(|| panic!("expected a forecast fetch, got {effects:?}"))
    }

    fn search_seq(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::SearchLocations { seq, .. }] => *seq,
            other => panic!("expected a single search, got {other:?}"),
        }
    }

    /// State after the startup forecast has loaded.
    fn mounted() -> ViewState {
        let mut state = ViewState::new();
        let seq = forecast_seq(&update(&mut state, ViewEvent::DefaultCityResolved("Lagos".into())));
        update(&mut state, ViewEvent::ForecastLoaded { seq, snapshot: snapshot("Lagos") });
        state
    }

    #[test]
    fn initial_state_is_loading_and_closed() {
        let state = ViewState::new();

        assert!(state.flags.loading);
        assert!(!state.flags.search_open);
        assert!(!state.flags.input_focused);
        assert!(state.forecast.is_none());
    }

    #[test]
    fn default_city_fetches_and_is_not_persisted() {
        let mut state = ViewState::new();

        let effects = update(&mut state, ViewEvent::DefaultCityResolved("Lagos".into()));
        assert_eq!(effects, vec![Effect::FetchForecast { seq: 1, city_name: "Lagos".into() }]);
        assert_eq!(state.pending_city(), Some("Lagos"));

        let effects =
            update(&mut state, ViewEvent::ForecastLoaded { seq: 1, snapshot: snapshot("Lagos") });
        assert!(effects.is_empty());
        assert!(!state.flags.loading);
        assert_eq!(state.forecast.as_ref().map(|f| f.location.name.as_str()), Some("Lagos"));
        assert_eq!(state.pending_city(), None);
    }

    #[test]
    fn short_queries_issue_no_search() {
        let mut state = mounted();
        update(&mut state, ViewEvent::SearchToggled);
        state.candidates = vec![LocationCandidate::new("London", "UK")];

        for query in ["", "L", "Lo", "  ", "Zü"] {
            let effects = update(&mut state, ViewEvent::QuerySettled(query.into()));
            assert!(effects.is_empty(), "query {query:?} issued a search");
        }
        // Left unchanged, not cleared.
        assert_eq!(state.candidates.len(), 1);
    }

    #[test]
    fn three_char_query_issues_search() {
        let mut state = mounted();
        update(&mut state, ViewEvent::SearchToggled);

        let effects = update(&mut state, ViewEvent::QuerySettled("Lon".into()));
        assert_eq!(effects, vec![Effect::SearchLocations { seq: 1, query: "Lon".into() }]);
    }

    #[test]
    fn search_response_replaces_candidates_and_clears_loading() {
        let mut state = ViewState::new();
        update(&mut state, ViewEvent::SearchToggled);
        let seq = search_seq(&update(&mut state, ViewEvent::QuerySettled("Lon".into())));

        update(
            &mut state,
            ViewEvent::CandidatesLoaded { seq, candidates: vec![LocationCandidate::new("London", "UK")] },
        );

        assert_eq!(state.candidates, vec![LocationCandidate::new("London", "UK")]);
        assert!(!state.flags.loading);
        assert!(state.dropdown_visible());
        assert_eq!(state.search_responses(), 1);
    }

    #[test]
    fn stale_search_response_is_discarded() {
        let mut state = mounted();
        update(&mut state, ViewEvent::SearchToggled);

        let first = search_seq(&update(&mut state, ViewEvent::QuerySettled("Lon".into())));
        let second = search_seq(&update(&mut state, ViewEvent::QuerySettled("Londo".into())));

        update(
            &mut state,
            ViewEvent::CandidatesLoaded { seq: second, candidates: vec![LocationCandidate::new("London", "UK")] },
        );
        // The older request resolves last and must not win.
        update(
            &mut state,
            ViewEvent::CandidatesLoaded { seq: first, candidates: vec![LocationCandidate::new("Lonavala", "India")] },
        );

        assert_eq!(state.candidates, vec![LocationCandidate::new("London", "UK")]);
        assert_eq!(state.search_responses(), 1);
    }

    #[test]
    fn search_failure_keeps_candidates() {
        let mut state = mounted();
        update(&mut state, ViewEvent::SearchToggled);
        state.candidates = vec![LocationCandidate::new("London", "UK")];
        let seq = search_seq(&update(&mut state, ViewEvent::QuerySettled("Lond".into())));

        update(&mut state, ViewEvent::SearchFailed { seq, message: "boom".into() });

        assert_eq!(state.candidates.len(), 1);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
        assert_eq!(state.search_responses(), 1);
    }

    #[test]
    fn toggle_flips_panel_without_touching_focus_or_loading() {
        let mut state = ViewState::new();
        update(&mut state, ViewEvent::InputFocused);

        update(&mut state, ViewEvent::SearchToggled);
        assert!(state.flags.search_open);
        assert!(state.flags.input_focused);
        assert!(state.flags.loading);

        update(&mut state, ViewEvent::SearchToggled);
        assert!(!state.flags.search_open);
        assert!(state.flags.input_focused);
        assert!(state.flags.loading);
    }

    #[test]
    fn closing_panel_clears_candidates_and_drops_in_flight_search() {
        let mut state = mounted();
        update(&mut state, ViewEvent::SearchToggled);
        let seq = search_seq(&update(&mut state, ViewEvent::QuerySettled("Lon".into())));
        state.candidates = vec![LocationCandidate::new("Lonely", "Nowhere")];

        let effects = update(&mut state, ViewEvent::SearchToggled);
        assert_eq!(effects, vec![Effect::CancelPendingSearch]);
        assert!(state.candidates.is_empty());

        update(
            &mut state,
            ViewEvent::CandidatesLoaded { seq, candidates: vec![LocationCandidate::new("London", "UK")] },
        );
        assert!(state.candidates.is_empty());
    }

    #[test]
    fn query_settled_while_panel_closed_is_ignored() {
        let mut state = mounted();
        update(&mut state, ViewEvent::SearchToggled);
        update(&mut state, ViewEvent::SearchToggled);

        let effects = update(&mut state, ViewEvent::QuerySettled("Lon".into()));

        assert!(effects.is_empty());
        assert!(state.candidates.is_empty());
        assert!(!state.flags.search_open);
    }

    #[test]
    fn search_response_keeps_spinner_while_forecast_in_flight() {
        let mut state = mounted();
        update(&mut state, ViewEvent::SearchToggled);
        let seq = search_seq(&update(&mut state, ViewEvent::QuerySettled("Lon".into())));
        forecast_seq(&update(&mut state, ViewEvent::DefaultCityResolved("Paris".into())));

        update(
            &mut state,
            ViewEvent::CandidatesLoaded { seq, candidates: vec![LocationCandidate::new("London", "UK")] },
        );

        assert_eq!(state.candidates.len(), 1);
        assert!(state.flags.loading);
        assert_eq!(state.pending_city(), Some("Paris"));
    }

    #[test]
    fn keyboard_hidden_always_unfocuses() {
        let mut state = ViewState::new();

        update(&mut state, ViewEvent::KeyboardHidden);
        assert!(!state.flags.input_focused);

        update(&mut state, ViewEvent::InputFocused);
        assert!(state.flags.input_focused);
        assert!(!state.shows_condition_art());

        update(&mut state, ViewEvent::KeyboardHidden);
        update(&mut state, ViewEvent::KeyboardHidden);
        assert!(!state.flags.input_focused);
        assert!(state.shows_condition_art());
    }

    #[test]
    fn back_press_unfocuses_input() {
        let mut state = mounted();
        update(&mut state, ViewEvent::InputFocused);

        let effects = update(&mut state, ViewEvent::BackPressed);
        assert!(effects.is_empty());
        assert!(!state.flags.input_focused);
    }

    #[test]
    fn selecting_candidate_fetches_then_persists() {
        let mut state = mounted();
        update(&mut state, ViewEvent::SearchToggled);
        update(&mut state, ViewEvent::InputFocused);
        state.candidates = vec![LocationCandidate::new("London", "UK")];

        let effects =
            update(&mut state, ViewEvent::CandidateSelected(LocationCandidate::new("London", "UK")));
        let seq = forecast_seq(&effects);
        assert_eq!(
            effects,
            vec![Effect::CancelPendingSearch, Effect::FetchForecast { seq, city_name: "London".into() }]
        );
        assert!(state.candidates.is_empty());
        assert!(!state.flags.search_open);
        assert!(state.flags.loading);

        let effects =
            update(&mut state, ViewEvent::ForecastLoaded { seq, snapshot: snapshot("London") });
        assert_eq!(effects, vec![Effect::PersistCity("London".into())]);
        assert!(!state.flags.loading);
        assert!(!state.flags.input_focused);
        assert_eq!(state.forecast.as_ref().map(|f| f.location.name.as_str()), Some("London"));
    }

    #[test]
    fn persists_candidate_name_not_provider_location_name() {
        let mut state = mounted();
        let seq = forecast_seq(&update(
            &mut state,
            ViewEvent::CandidateSelected(LocationCandidate::new("Londres", "France")),
        ));

        let effects =
            update(&mut state, ViewEvent::ForecastLoaded { seq, snapshot: snapshot("London") });
        assert_eq!(effects, vec![Effect::PersistCity("Londres".into())]);
    }

    #[test]
    fn superseded_forecast_is_discarded() {
        let mut state = ViewState::new();
        let startup = forecast_seq(&update(&mut state, ViewEvent::DefaultCityResolved("Lagos".into())));
        let chosen = forecast_seq(&update(
            &mut state,
            ViewEvent::CandidateSelected(LocationCandidate::new("Paris", "France")),
        ));

        update(&mut state, ViewEvent::ForecastLoaded { seq: chosen, snapshot: snapshot("Paris") });
        let effects =
            update(&mut state, ViewEvent::ForecastLoaded { seq: startup, snapshot: snapshot("Lagos") });

        assert!(effects.is_empty());
        assert_eq!(state.forecast.as_ref().map(|f| f.location.name.as_str()), Some("Paris"));
    }

    #[test]
    fn forecast_failure_stops_spinner_and_allows_retry() {
        let mut state = ViewState::new();
        let seq = forecast_seq(&update(&mut state, ViewEvent::DefaultCityResolved("Lagos".into())));

        update(&mut state, ViewEvent::ForecastFailed { seq, message: "offline".into() });
        assert!(!state.flags.loading);
        assert_eq!(state.last_error.as_deref(), Some("offline"));
        assert!(state.can_retry());

        let effects = update(&mut state, ViewEvent::RetryRequested);
        let retry = forecast_seq(&effects);
        assert!(retry > seq);
        assert!(state.flags.loading);
        assert!(state.last_error.is_none());
        assert!(!state.can_retry());

        update(&mut state, ViewEvent::ForecastLoaded { seq: retry, snapshot: snapshot("Lagos") });
        assert!(state.forecast.is_some());
    }

    #[test]
    fn retried_selection_is_still_persisted() {
        let mut state = mounted();
        let seq = forecast_seq(&update(
            &mut state,
            ViewEvent::CandidateSelected(LocationCandidate::new("Oslo", "Norway")),
        ));
        update(&mut state, ViewEvent::ForecastFailed { seq, message: "timeout".into() });

        let retry = forecast_seq(&update(&mut state, ViewEvent::RetryRequested));
        let effects =
            update(&mut state, ViewEvent::ForecastLoaded { seq: retry, snapshot: snapshot("Oslo") });
        assert_eq!(effects, vec![Effect::PersistCity("Oslo".into())]);
    }

    #[test]
    fn retry_without_failure_does_nothing() {
        let mut state = mounted();
        assert!(update(&mut state, ViewEvent::RetryRequested).is_empty());
    }
}
