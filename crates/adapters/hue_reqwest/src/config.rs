//! HTTP settings shared by the bridge client and the pairing flow.

use std::time::Duration;

use serde::Deserialize;

use crate::error::HueError;

/// Default N-UPnP discovery endpoint.
pub const DEFAULT_DISCOVERY_URL: &str = "https://discovery.meethue.com";

/// Configuration for talking to the bridge.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HueClientConfig {
    /// Endpoint listing the bridges registered from this network.
    pub discovery_url: String,
    /// Per-request timeout in seconds. Requests never time out when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Default for HueClientConfig {
    fn default() -> Self {
        Self {
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl HueClientConfig {
    /// Build the HTTP client used for every bridge request.
    ///
    /// # Errors
    ///
    /// Returns [`HueError::Http`] if the TLS backend cannot be initialised.
    pub fn http_client(&self) -> Result<reqwest::Client, HueError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}
