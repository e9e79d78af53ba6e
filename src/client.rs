//! HTTP client for the AviaSky search service

use crate::config::ClientConfig;
use crate::{AviaError, City, Flight, SearchQuery};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Operations the search page needs from the service.
///
/// [`AviaClient`] is the production implementation; tests drive the page
/// with in-memory backends.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Full city catalog
    async fn fetch_cities(&self) -> Result<Vec<City>, AviaError>;

    /// Flights matching the query
    async fn search_flights(&self, query: &SearchQuery) -> Result<Vec<Flight>, AviaError>;

    /// Base URL of the messaging bot used for booking hand-off
    async fn fetch_telegram_url(&self) -> Result<String, AviaError>;
}

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    #[serde(default)]
    cities: Vec<City>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    flights: Vec<Flight>,
    #[serde(default)]
    search_params: Option<EchoedParams>,
}

/// Parameters the service echoes back with search results
#[derive(Debug, Deserialize)]
struct EchoedParams {
    origin: Option<String>,
    destination: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    telegram_url: Option<String>,
}

/// Main client for making requests to the search service
pub struct AviaClient {
    http_client: Client,
    config: ClientConfig,
}

impl AviaClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self, AviaError> {
        debug!(endpoint = %config.endpoint, "Creating AviaSky client");
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Cities whose name or country contains `query`, filtered by the service
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_cities_matching(&self, query: &str) -> Result<Vec<City>, AviaError> {
        let response: CitiesResponse = self
            .get_action("cities", &[("action", "cities"), ("q", query)])
            .await?;
        info!(cities = response.cities.len(), "City lookup completed");
        Ok(response.cities)
    }

    async fn get_action<T: DeserializeOwned>(
        &self,
        action: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T, AviaError> {
        let start_time = std::time::Instant::now();
        let response = self
            .http_client
            .get(self.config.endpoint.clone())
            .query(params)
            .send()
            .await?;
        let status = response.status();

        info!(
            action,
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "HTTP request completed"
        );

        if !status.is_success() {
            error!(action, status = %status, "HTTP request failed");
            return Err(AviaError::BadStatus {
                action,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(action, body_length = body.len(), "Received response body");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SearchBackend for AviaClient {
    #[instrument(level = "info", skip(self))]
    async fn fetch_cities(&self) -> Result<Vec<City>, AviaError> {
        let response: CitiesResponse = self.get_action("cities", &[("action", "cities")]).await?;
        info!(cities = response.cities.len(), "City catalog received");
        Ok(response.cities)
    }

    #[instrument(level = "info", skip(self), fields(origin = %query.origin, destination = %query.destination))]
    async fn search_flights(&self, query: &SearchQuery) -> Result<Vec<Flight>, AviaError> {
        let response: SearchResponse = self.get_action("search", &query.to_pairs()).await?;

        if let Some(echo) = &response.search_params {
            debug!(
                origin = echo.origin.as_deref().unwrap_or("-"),
                destination = echo.destination.as_deref().unwrap_or("-"),
                date = echo.date.as_deref().unwrap_or("-"),
                "Service echoed search parameters"
            );
        }

        info!(flights_found = response.flights.len(), "Flight search completed");
        Ok(response.flights)
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_telegram_url(&self) -> Result<String, AviaError> {
        let response: TelegramResponse =
            self.get_action("telegram", &[("action", "telegram")]).await?;
        response
            .telegram_url
            .filter(|url| !url.is_empty())
            .ok_or(AviaError::MissingMessagingUrl)
    }
}
