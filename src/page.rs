//! Search page controller
//!
//! [`SearchPage`] owns everything the flight search form shows: the two city
//! autocompletes, their query text and selections, the shared city catalog,
//! the date fields and the result list. Input events are routed through it,
//! and it performs the catalog and search requests through a
//! [`SearchBackend`].

use crate::autocomplete::{Autocomplete, AutocompleteEvent, AutocompleteView, Key};
use crate::booking::{booking_message, deep_link};
use crate::catalog::CityCatalog;
use crate::client::SearchBackend;
use crate::events::{EventScope, PointerEvent, Rect};
use crate::{AviaError, City, Flight, SearchQuery};
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Layout of the two city inputs including their dropdown area
const ORIGIN_BOUNDS: Rect = Rect {
    x: 0,
    y: 0,
    width: 32,
    height: 11,
};
const DESTINATION_BOUNDS: Rect = Rect {
    x: 34,
    y: 0,
    width: 32,
    height: 11,
};

/// One of the two city inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Origin,
    Destination,
}

impl Field {
    pub fn opposite(self) -> Self {
        match self {
            Field::Origin => Field::Destination,
            Field::Destination => Field::Origin,
        }
    }
}

/// Unmet search precondition; the message is shown as a blocking alert
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all search fields: choose a departure city from the list")]
    MissingOrigin,

    #[error("Please fill in all search fields: choose a destination city from the list")]
    MissingDestination,

    #[error("Please fill in all search fields: pick a departure date")]
    MissingDepartDate,
}

/// Result of pressing the search button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Preconditions not met; an alert is pending and nothing was sent
    Blocked(ValidationError),
    /// Results replaced with this many flights
    Completed { flights: usize },
    /// Request failed; previous results were kept
    Failed,
}

/// State of the search trigger control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchButton {
    pub label: &'static str,
    pub disabled: bool,
    pub spinner: bool,
}

/// Snapshot of the whole page for rendering
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub origin: AutocompleteView<'a>,
    pub destination: AutocompleteView<'a>,
    pub depart_date: &'a str,
    pub return_date: &'a str,
    pub button: SearchButton,
    pub flights: &'a [Flight],
    pub alert: Option<String>,
}

#[derive(Debug)]
struct CityInput {
    query: String,
    selected: Option<City>,
    autocomplete: Autocomplete<City>,
}

impl CityInput {
    fn new(placeholder: &str, icon: &str) -> Self {
        Self {
            query: String::new(),
            selected: None,
            autocomplete: Autocomplete::new(placeholder).with_icon(icon),
        }
    }
}

/// Page-level state of the flight search form
pub struct SearchPage<B: SearchBackend> {
    backend: B,
    scope: EventScope,
    catalog: CityCatalog,
    origin: CityInput,
    destination: CityInput,
    depart_date: String,
    return_date: String,
    flights: Vec<Flight>,
    last_query: Option<SearchQuery>,
    catalog_loading: bool,
    search_loading: bool,
    alert: Option<ValidationError>,
    telegram_url: Option<String>,
}

impl<B: SearchBackend> SearchPage<B> {
    /// Create the page and mount both city inputs on `scope`
    pub fn new(backend: B, scope: EventScope) -> Self {
        let mut origin = CityInput::new("From", "MapPin");
        let mut destination = CityInput::new("To", "Navigation");
        origin.autocomplete.mount(&scope, ORIGIN_BOUNDS);
        destination.autocomplete.mount(&scope, DESTINATION_BOUNDS);

        Self {
            backend,
            scope,
            catalog: CityCatalog::default(),
            origin,
            destination,
            depart_date: String::new(),
            return_date: String::new(),
            flights: Vec::new(),
            last_query: None,
            catalog_loading: false,
            search_loading: false,
            alert: None,
            telegram_url: None,
        }
    }

    /// Fetch the city catalog; failures leave it empty.
    ///
    /// Once a catalog has been loaded, later calls return without a request.
    #[instrument(level = "info", skip(self))]
    pub async fn load_catalog(&mut self) {
        if !self.catalog.is_empty() {
            debug!("City catalog already loaded");
            return;
        }
        self.set_catalog_loading(true);

        match self.backend.fetch_cities().await {
            Ok(cities) => {
                info!(cities = cities.len(), "City catalog loaded");
                self.origin.autocomplete.set_options(cities.clone());
                self.destination.autocomplete.set_options(cities.clone());
                self.catalog = CityCatalog::new(cities);
            }
            Err(e) => {
                error!(error = %e, "Error fetching cities");
            }
        }

        self.set_catalog_loading(false);
    }

    /// Text of `field` changed; any previous selection no longer applies
    pub fn on_change(&mut self, field: Field, text: impl Into<String>) {
        let text = text.into();
        let exclude = self.selected_code(field.opposite());
        let suggestions = self.catalog.filter(&text, exclude.as_deref());
        debug!(?field, query = %text, suggestions = suggestions.len(), "Suggestions updated");

        let input = self.input_mut(field);
        input.query = text;
        let cleared = input.selected.take().is_some();
        input.autocomplete.set_options(suggestions);

        // The city given up here is offered again in the other field.
        if cleared {
            self.refresh_opposite(field);
        }
    }

    /// A city was committed in `field`
    pub fn on_select(&mut self, field: Field, city: City) {
        info!(?field, code = %city.code, "City selected");
        let input = self.input_mut(field);
        input.query = city.name.clone();
        input.selected = Some(city);

        // The other field must stop offering the city just taken.
        self.refresh_opposite(field);
    }

    pub fn focus(&mut self, field: Field) {
        self.input_mut(field).autocomplete.focus();
    }

    pub fn type_text(&mut self, field: Field, text: &str) {
        let events = self.input_mut(field).autocomplete.input(text);
        self.apply(field, events);
    }

    pub fn press_key(&mut self, field: Field, key: Key) {
        let events = self.input_mut(field).autocomplete.key(key);
        self.apply(field, events);
    }

    pub fn click_option(&mut self, field: Field, index: usize) {
        let events = self.input_mut(field).autocomplete.click_option(index);
        self.apply(field, events);
    }

    /// Deliver a pointer event to the page document
    pub fn dispatch_pointer(&self, event: PointerEvent) {
        self.scope.dispatch(&event);
    }

    pub fn set_depart_date(&mut self, date: impl Into<String>) {
        self.depart_date = date.into();
    }

    /// Shown in the form only; the service searches one-way
    pub fn set_return_date(&mut self, date: impl Into<String>) {
        self.return_date = date.into();
    }

    /// Run a search with the current selections
    #[instrument(level = "info", skip(self))]
    pub async fn search(&mut self) -> SearchOutcome {
        let query = match self.validate() {
            Ok(query) => query,
            Err(e) => {
                warn!(reason = %e, "Search blocked");
                self.alert = Some(e);
                return SearchOutcome::Blocked(e);
            }
        };

        self.search_loading = true;
        let result = self.backend.search_flights(&query).await;
        self.search_loading = false;

        match result {
            Ok(flights) => {
                info!(flights_found = flights.len(), "Search results received");
                let count = flights.len();
                self.flights = flights;
                self.last_query = Some(query);
                SearchOutcome::Completed { flights: count }
            }
            Err(e) => {
                error!(error = %e, "Error searching flights");
                SearchOutcome::Failed
            }
        }
    }

    /// Deep link that opens the booking chat for a flight in the current results
    #[instrument(level = "info", skip(self))]
    pub async fn booking_link(&mut self, flight_id: &str) -> Result<Url, AviaError> {
        let flight = self
            .flights
            .iter()
            .find(|f| f.id == flight_id)
            .ok_or_else(|| AviaError::FlightNotFound(flight_id.to_string()))?;
        let depart_date = self
            .last_query
            .as_ref()
            .map(|q| q.depart_date.as_str())
            .unwrap_or(self.depart_date.as_str());
        let message = booking_message(flight, depart_date);

        let bot_url = match self.telegram_url.clone() {
            Some(url) => url,
            None => {
                let url = self.backend.fetch_telegram_url().await?;
                self.telegram_url = Some(url.clone());
                url
            }
        };

        deep_link(&bot_url, &message)
    }

    pub fn search_button(&self) -> SearchButton {
        if self.search_loading {
            SearchButton {
                label: "Searching...",
                disabled: true,
                spinner: true,
            }
        } else {
            SearchButton {
                label: "Find flights",
                disabled: false,
                spinner: false,
            }
        }
    }

    pub fn alert(&self) -> Option<ValidationError> {
        self.alert
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub fn query(&self, field: Field) -> &str {
        &self.input(field).query
    }

    pub fn selected(&self, field: Field) -> Option<&City> {
        self.input(field).selected.as_ref()
    }

    pub fn suggestions(&self, field: Field) -> &[City] {
        self.input(field).autocomplete.options()
    }

    pub fn autocomplete(&self, field: Field) -> &Autocomplete<City> {
        &self.input(field).autocomplete
    }

    pub fn depart_date(&self) -> &str {
        &self.depart_date
    }

    pub fn return_date(&self) -> &str {
        &self.return_date
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn is_catalog_loading(&self) -> bool {
        self.catalog_loading
    }

    pub fn is_searching(&self) -> bool {
        self.search_loading
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self) -> PageView<'_> {
        PageView {
            origin: self.origin.autocomplete.view(&self.origin.query),
            destination: self.destination.autocomplete.view(&self.destination.query),
            depart_date: &self.depart_date,
            return_date: &self.return_date,
            button: self.search_button(),
            flights: &self.flights,
            alert: self.alert.map(|a| a.to_string()),
        }
    }

    fn validate(&self) -> Result<SearchQuery, ValidationError> {
        let origin = self
            .origin
            .selected
            .as_ref()
            .ok_or(ValidationError::MissingOrigin)?;
        let destination = self
            .destination
            .selected
            .as_ref()
            .ok_or(ValidationError::MissingDestination)?;
        if self.depart_date.trim().is_empty() {
            return Err(ValidationError::MissingDepartDate);
        }

        Ok(SearchQuery {
            origin: origin.code.clone(),
            destination: destination.code.clone(),
            depart_date: self.depart_date.trim().to_string(),
        })
    }

    fn apply(&mut self, field: Field, events: Vec<AutocompleteEvent<City>>) {
        for event in events {
            match event {
                AutocompleteEvent::Changed(text) => self.on_change(field, text),
                AutocompleteEvent::Selected(city) => self.on_select(field, city),
            }
        }
    }

    /// Recompute the other field's suggestions against `field`'s selection
    fn refresh_opposite(&mut self, field: Field) {
        if self.catalog.is_empty() {
            return;
        }
        let other = field.opposite();
        let exclude = self.selected_code(field);
        let suggestions = self.catalog.filter(&self.input(other).query, exclude.as_deref());
        self.input_mut(other).autocomplete.set_options(suggestions);
    }

    fn set_catalog_loading(&mut self, loading: bool) {
        self.catalog_loading = loading;
        self.origin.autocomplete.set_loading(loading);
        self.destination.autocomplete.set_loading(loading);
    }

    fn selected_code(&self, field: Field) -> Option<String> {
        self.input(field).selected.as_ref().map(|c| c.code.clone())
    }

    fn input(&self, field: Field) -> &CityInput {
        match field {
            Field::Origin => &self.origin,
            Field::Destination => &self.destination,
        }
    }

    fn input_mut(&mut self, field: Field) -> &mut CityInput {
        match field {
            Field::Origin => &mut self.origin,
            Field::Destination => &mut self.destination,
        }
    }
}
