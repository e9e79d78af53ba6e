//! Plain-text rendering of the search page

use crate::autocomplete::AutocompleteView;
use crate::page::{PageView, SearchButton};
use crate::Flight;

const CARD_WIDTH: usize = 56;

/// Result card for one flight
pub fn flight_card(flight: &Flight) -> String {
    let rule = "─".repeat(CARD_WIDTH);
    let mut lines = vec![
        format!("┌{}┐", rule),
        format!(
            "  {}  ──✈──  {}    {}",
            flight.departure_time,
            flight.arrival_time,
            flight.price()
        ),
        format!(
            "  {:<5}        {:<5}    {}",
            flight.origin, flight.destination, flight.duration
        ),
        format!(
            "  {} · {} · {} · {}",
            flight.airline,
            flight.stops_label(),
            flight.aircraft,
            flight.id
        ),
    ];
    if let Some(savings) = flight.savings() {
        lines.push(format!("  Save {}", savings));
    }
    lines.push(format!("└{}┘", rule));
    lines.join("\n")
}

/// Result section; empty when there is nothing to show
pub fn results(flights: &[Flight]) -> String {
    if flights.is_empty() {
        return String::new();
    }

    let mut out = String::from("Search results\n");
    for flight in flights {
        out.push_str(&flight_card(flight));
        out.push('\n');
    }
    out
}

/// Input line followed by the dropdown rows when visible
pub fn autocomplete(view: &AutocompleteView<'_>) -> String {
    let icon = view.icon.map(|i| format!("[{}] ", i)).unwrap_or_default();
    let text = if view.value.is_empty() {
        format!("<{}>", view.placeholder)
    } else {
        view.value.to_string()
    };
    let spinner = if view.loading { " …" } else { "" };
    let mut out = format!("{}{}{}", icon, text, spinner);

    for row in view.dropdown.iter().flatten() {
        let marker = if row.highlighted { '>' } else { ' ' };
        out.push_str(&format!(
            "\n {} {:<24} {:<16} {}",
            marker, row.label, row.detail, row.key
        ));
    }
    out
}

pub fn button(button: &SearchButton) -> String {
    let icon = if button.spinner { "⟳" } else { "🔍" };
    if button.disabled {
        format!("[{} {}] (disabled)", icon, button.label)
    } else {
        format!("[{} {}]", icon, button.label)
    }
}

/// Whole page: form, pending alert, results
pub fn page(view: &PageView<'_>) -> String {
    let mut out = format!(
        "From: {}\nTo:   {}\nDepart: {}\nReturn: {}\n{}\n",
        autocomplete(&view.origin),
        autocomplete(&view.destination),
        date_or_blank(view.depart_date),
        date_or_blank(view.return_date),
        button(&view.button)
    );
    if let Some(alert) = &view.alert {
        out.push_str(&format!("! {}\n", alert));
    }
    out.push_str(&results(view.flights));
    out
}

fn date_or_blank(date: &str) -> &str {
    if date.is_empty() {
        "--"
    } else {
        date
    }
}
