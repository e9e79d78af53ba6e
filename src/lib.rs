//! # AviaSky
//!
//! Headless flight search client for the AviaSky search service.
//! The crate provides the pieces of the search page without a browser:
//! a city autocomplete component, the page controller that wires two of
//! them to a shared city catalog, and the HTTP client for the service.

pub mod autocomplete;
pub mod booking;
pub mod catalog;
pub mod client;
pub mod config;
pub mod events;
pub mod page;
pub mod render;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Re-export main types for convenience
pub use autocomplete::{Autocomplete, AutocompleteEvent, Key, SearchOption};
pub use catalog::{CityCatalog, MAX_SUGGESTIONS};
pub use client::{AviaClient, SearchBackend};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use events::{EventScope, Point, PointerEvent, Rect, Subscription};
pub use page::{Field, SearchOutcome, SearchPage, ValidationError};

/// Error types for the AviaSky client
#[derive(Error, Debug)]
pub enum AviaError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Search service returned status {status} for action '{action}'")]
    BadStatus { action: &'static str, status: u16 },

    #[error("Flight not found in current results: {0}")]
    FlightNotFound(String),

    #[error("Search service did not provide a messaging URL")]
    MissingMessagingUrl,
}

/// City from the search service catalog, identified by its IATA code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub code: String,
    pub name: String,
    pub country: String,
}

impl City {
    pub fn new(code: &str, name: &str, country: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            country: country.to_string(),
        }
    }
}

/// Individual flight returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub price: i64,
    pub currency: String,
    pub stops: u32,
    pub aircraft: String,
    /// Amount saved against the usual fare, in the same currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<i64>,
}

impl Flight {
    pub fn price(&self) -> FlightPrice {
        FlightPrice {
            amount: self.price,
            currency: self.currency.clone(),
        }
    }

    pub fn savings(&self) -> Option<FlightPrice> {
        self.savings.filter(|s| *s > 0).map(|amount| FlightPrice {
            amount,
            currency: self.currency.clone(),
        })
    }

    pub fn stops_label(&self) -> String {
        match self.stops {
            0 => "Direct".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        }
    }
}

/// Price information with amount and currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightPrice {
    pub amount: i64,
    pub currency: String,
}

impl fmt::Display for FlightPrice {
    /// Groups thousands with spaces: `25 650 ₽`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.amount.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }
        if self.amount < 0 {
            write!(f, "-")?;
        }
        if self.currency.is_empty() {
            write!(f, "{}", grouped)
        } else {
            write!(f, "{} {}", grouped, self.currency)
        }
    }
}

/// Flight search parameters sent to the service.
///
/// The service accepts `origin`, `destination` and `depart_date`; the
/// `from`/`to`/`date` spelling is not used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub depart_date: String,
}

impl SearchQuery {
    /// Query pairs in the order the service documents them
    pub fn to_pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("action", "search"),
            ("origin", &self.origin),
            ("destination", &self.destination),
            ("depart_date", &self.depart_date),
        ]
    }
}

/// Fetch the full city catalog from the default endpoint
pub async fn fetch_cities() -> Result<Vec<City>, AviaError> {
    let client = AviaClient::new(ClientConfig::default())?;
    client.fetch_cities().await
}

/// One-shot flight search against the default endpoint
///
/// # Example
/// ```no_run
/// use aviasky::{search_flights, SearchQuery};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let query = SearchQuery {
///     origin: "MOW".to_string(),
///     destination: "PAR".to_string(),
///     depart_date: "2025-08-15".to_string(),
/// };
/// let flights = search_flights(&query).await?;
/// println!("Found {} flights", flights.len());
/// # Ok(())
/// # }
/// ```
pub async fn search_flights(query: &SearchQuery) -> Result<Vec<Flight>, AviaError> {
    let client = AviaClient::new(ClientConfig::default())?;
    client.search_flights(query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(price: i64, stops: u32) -> Flight {
        Flight {
            id: "SU2108".to_string(),
            airline: "Аэрофлот".to_string(),
            origin: "MOW".to_string(),
            destination: "PAR".to_string(),
            departure_time: "08:30".to_string(),
            arrival_time: "11:45".to_string(),
            duration: "3ч 15м".to_string(),
            price,
            currency: "₽".to_string(),
            stops,
            aircraft: "Airbus A320".to_string(),
            savings: None,
        }
    }

    #[test]
    fn test_price_grouping() {
        assert_eq!(flight(25650, 0).price().to_string(), "25 650 ₽");
        assert_eq!(flight(1234567, 0).price().to_string(), "1 234 567 ₽");
        assert_eq!(flight(999, 0).price().to_string(), "999 ₽");
        assert_eq!(flight(0, 0).price().to_string(), "0 ₽");

        let bare = FlightPrice {
            amount: -4500,
            currency: String::new(),
        };
        assert_eq!(bare.to_string(), "-4 500");
    }

    #[test]
    fn test_stops_label() {
        assert_eq!(flight(1, 0).stops_label(), "Direct");
        assert_eq!(flight(1, 1).stops_label(), "1 stop");
        assert_eq!(flight(1, 3).stops_label(), "3 stops");
    }

    #[test]
    fn test_savings_ignores_non_positive() {
        let mut f = flight(28900, 1);
        assert!(f.savings().is_none());
        f.savings = Some(0);
        assert!(f.savings().is_none());
        f.savings = Some(3200);
        assert_eq!(f.savings().unwrap().to_string(), "3 200 ₽");
    }

    #[test]
    fn test_flight_deserializes_without_savings() {
        let json = r#"{
            "id": "TK413", "airline": "Turkish Airlines", "origin": "MOW",
            "destination": "PAR", "departure_time": "14:20", "arrival_time": "19:35",
            "duration": "5ч 15м", "price": 28900, "currency": "₽", "stops": 1,
            "aircraft": "Boeing 737"
        }"#;
        let flight: Flight = serde_json::from_str(json).unwrap();
        assert_eq!(flight.id, "TK413");
        assert_eq!(flight.stops, 1);
        assert_eq!(flight.savings, None);
    }

    #[test]
    fn test_search_query_pairs() {
        let query = SearchQuery {
            origin: "LON".to_string(),
            destination: "PAR".to_string(),
            depart_date: "2025-08-15".to_string(),
        };
        let pairs = query.to_pairs();
        assert_eq!(pairs[0], ("action", "search"));
        assert_eq!(pairs[1], ("origin", "LON"));
        assert_eq!(pairs[2], ("destination", "PAR"));
        assert_eq!(pairs[3], ("depart_date", "2025-08-15"));
    }
}
