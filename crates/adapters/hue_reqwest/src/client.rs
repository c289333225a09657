//! [`BridgeClient`] implementation over the v1 REST API.

use std::future::Future;

use serde_json::Value;

use huemqtt_app::ports::BridgeClient;
use huemqtt_domain::credentials::Credentials;
use huemqtt_domain::error::HueMqttError;
use huemqtt_domain::group::{Group, GroupId};
use huemqtt_domain::light::{Light, LightId, LightStateUpdate};

use crate::error::HueError;
use crate::wire;

/// Authorised connection to one bridge.
#[derive(Debug, Clone)]
pub struct HueClient {
    http: reqwest::Client,
    base_url: String,
}

impl HueClient {
    /// Client for the bridge at `credentials.address`, acting as
    /// `credentials.username`.
    #[must_use]
    pub fn new(http: reqwest::Client, credentials: &Credentials) -> Self {
        Self {
            http,
            base_url: format!(
                "http://{}/api/{}",
                credentials.address, credentials.username
            ),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> Result<Value, HueError> {
        let url = self.url(path);
        tracing::trace!(%path, "GET");
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }

    async fn put(&self, path: &str, update: &LightStateUpdate) -> Result<(), HueError> {
        let url = self.url(path);
        tracing::debug!(%path, ?update, "PUT");
        let body: Value = self
            .http
            .put(url)
            .json(update)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        wire::check_mutation(&body)
    }
}

impl BridgeClient for HueClient {
    fn lights(&self) -> impl Future<Output = Result<Vec<Light>, HueMqttError>> + Send {
        async move {
            let body = self.get("lights").await?;
            Ok(wire::parse_lights(body)?)
        }
    }

    fn groups(&self) -> impl Future<Output = Result<Vec<Group>, HueMqttError>> + Send {
        async move {
            let body = self.get("groups").await?;
            Ok(wire::parse_groups(body)?)
        }
    }

    fn set_light_state(
        &self,
        id: LightId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        async move { Ok(self.put(&format!("lights/{id}/state"), update).await?) }
    }

    fn set_group_state(
        &self,
        id: GroupId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        async move { Ok(self.put(&format!("groups/{id}/action"), update).await?) }
    }
}
