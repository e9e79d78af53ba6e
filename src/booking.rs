//! Booking hand-off to the messaging bot

use crate::{AviaError, Flight};
use chrono::NaiveDate;
use reqwest::Url;

/// Pre-filled message the bot receives when the user buys a flight
pub fn booking_message(flight: &Flight, depart_date: &str) -> String {
    let date = NaiveDate::parse_from_str(depart_date, "%Y-%m-%d")
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|_| depart_date.to_string());

    format!(
        "Hello! I want to book flight {} ({}) {} → {} on {}, {}-{}, {}. Price: {}",
        flight.id,
        flight.airline,
        flight.origin,
        flight.destination,
        date,
        flight.departure_time,
        flight.arrival_time,
        flight.stops_label().to_lowercase(),
        flight.price(),
    )
}

/// Deep link opening the bot chat with `message` already typed
pub fn deep_link(bot_url: &str, message: &str) -> Result<Url, AviaError> {
    let mut url = Url::parse(bot_url).map_err(|e| AviaError::InvalidEndpoint {
        url: bot_url.to_string(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut().append_pair("text", message);
    Ok(url)
}
