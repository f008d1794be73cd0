use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    debounce::Debouncer,
    model::SearchRequest,
    provider::WeatherProvider,
    view::ViewEvent,
};

/// Queries shorter than this never reach the provider.
pub const MIN_QUERY_CHARS: usize = 3;

pub fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

/// Turns raw keystrokes into debounced location searches.
#[derive(Debug)]
pub struct SearchCoordinator {
    provider: Arc<dyn WeatherProvider>,
    debouncer: Debouncer<String>,
}

impl SearchCoordinator {
    /// Settled queries are posted to `events` as [`ViewEvent::QuerySettled`].
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        window: Duration,
        events: UnboundedSender<ViewEvent>,
    ) -> Self {
        let debouncer = Debouncer::new(window, move |query: String| {
            let _ = events.send(ViewEvent::QuerySettled(query));
        });

        Self { provider, debouncer }
    }

    pub fn on_query_changed(&self, raw_text: &str) {
        self.debouncer.call(raw_text.to_string());
    }

    /// Forget a query that has not settled yet.
    pub fn cancel(&self) {
        self.debouncer.cancel();
    }

    /// Run one tagged search in the background and post its outcome.
    pub fn spawn_search(&self, seq: u64, query: String, events: UnboundedSender<ViewEvent>) {
        let provider = Arc::clone(&self.provider);

        tokio::spawn(async move {
            tracing::debug!(seq, %query, "Searching locations");
            let request = SearchRequest { city_name: query };

            let event = match provider.search_locations(&request).await {
                Ok(candidates) => ViewEvent::CandidatesLoaded { seq, candidates },
                Err(e) => {
                    tracing::warn!(seq, query = %request.city_name, "Location search failed: {e:#}");
                    ViewEvent::SearchFailed { seq, message: format!("{e:#}") }
                }
            };

            let _ = events.send(event);
        });
    }
}
