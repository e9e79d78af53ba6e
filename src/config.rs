//! Client configuration

use crate::AviaError;
use reqwest::Url;

/// Production endpoint of the AviaSky search function
pub const DEFAULT_ENDPOINT: &str =
    "https://functions.poehali.dev/6cdc378e-a07f-445d-bf2d-624439860b60";

const DEFAULT_USER_AGENT: &str = concat!("aviasky/", env!("CARGO_PKG_VERSION"));

/// Settings for [`crate::AviaClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every action is sent to as `?action=...`
    pub endpoint: Url,
    pub user_agent: String,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub system_proxy: bool,
}

impl ClientConfig {
    /// Build a config for a custom endpoint base URL
    pub fn with_endpoint(endpoint: &str) -> Result<Self, AviaError> {
        let url = Url::parse(endpoint).map_err(|e| AviaError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AviaError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Self {
            endpoint: url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            system_proxy: true,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            system_proxy: true,
        }
    }
}
