//! [`BridgePairing`] implementation: N-UPnP discovery and user registration.

use std::future::Future;

use serde_json::Value;

use huemqtt_app::ports::{BridgePairing, DiscoveredBridge};
use huemqtt_domain::error::HueMqttError;

use crate::error::HueError;
use crate::wire::{self, RegisterRequest};

/// Unauthenticated access used while pairing.
#[derive(Debug, Clone)]
pub struct HuePairing {
    http: reqwest::Client,
    discovery_url: String,
}

impl HuePairing {
    #[must_use]
    pub fn new(http: reqwest::Client, discovery_url: impl Into<String>) -> Self {
        Self {
            http,
            discovery_url: discovery_url.into(),
        }
    }

    async fn fetch_bridges(&self) -> Result<Vec<DiscoveredBridge>, HueError> {
        let body: Value = self
            .http
            .get(&self.discovery_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(wire::parse_discovery(body)?
            .into_iter()
            .map(|entry| DiscoveredBridge {
                id: entry.id,
                address: entry.address,
            })
            .collect())
    }

    async fn create_user(&self, address: &str, device_type: &str) -> Result<String, HueError> {
        let body: Value = self
            .http
            .post(format!("http://{address}/api"))
            .json(&RegisterRequest {
                devicetype: device_type,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        wire::parse_registration(body)
    }
}

impl BridgePairing for HuePairing {
    fn discover(
        &self,
    ) -> impl Future<Output = Result<Vec<DiscoveredBridge>, HueMqttError>> + Send {
        async move { Ok(self.fetch_bridges().await?) }
    }

    fn register(
        &self,
        address: &str,
        device_type: &str,
    ) -> impl Future<Output = Result<String, HueMqttError>> + Send {
        async move {
            let result = self.create_user(address, device_type).await;
            if let Err(HueError::LinkButtonNotPressed) = &result {
                tracing::error!(%address, "press the link button on the bridge, then start again");
            }
            Ok(result?)
        }
    }
}
