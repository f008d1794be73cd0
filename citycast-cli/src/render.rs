use citycast_core::{ForecastSnapshot, LocationCandidate, ViewState};
use std::fmt::Write;

/// Text rendering of the forecast view.
pub fn forecast(snapshot: &ForecastSnapshot, show_art: bool) -> String {
    let mut out = String::new();
    let current = &snapshot.current;

    let _ = writeln!(out, "{}, {}", snapshot.location.name, snapshot.location.country);
    if show_art {
        let _ = writeln!(out, "[{}]", current.condition.art().asset_name());
    }
    let _ = writeln!(out, "{}°  {}", current.temp_c, current.condition.text.trim());
    let _ = writeln!(
        out,
        "wind {}km  humidity {}%  sunrise {}",
        current.wind_kph,
        current.humidity,
        snapshot.sunrise_today().unwrap_or("-"),
    );

    if !snapshot.days().is_empty() {
        let _ = writeln!(out, "\nDaily forecast");
        for day in snapshot.days() {
            let _ = writeln!(
                out,
                "  {:<4} {:>5.1}°  {}",
                day.weekday_label(),
                day.day.avgtemp_c,
                day.day.condition.text.trim(),
            );
        }
    }

    out
}

pub fn candidate(candidate: &LocationCandidate) -> String {
    match &candidate.region {
        Some(region) => format!("{} ({})", candidate.label(), region),
        None => candidate.label(),
    }
}

/// Whole screen: error banner, then the forecast or a loading line.
pub fn screen(state: &ViewState) -> String {
    let mut out = String::new();

    if let Some(err) = &state.last_error {
        let _ = writeln!(out, "! {err}");
    }

    match &state.forecast {
        _ if state.flags.loading => out.push_str("Loading...\n"),
        Some(snapshot) => out.push_str(&forecast(snapshot, state.shows_condition_art())),
        None => out.push_str("No forecast available.\n"),
    }

    out
}
