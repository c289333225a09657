//! [`BusPublisher`] implementation over a rumqttc client handle.

use std::future::Future;

use rumqttc::{AsyncClient, QoS};

use huemqtt_app::ports::BusPublisher;
use huemqtt_domain::error::HueMqttError;

use crate::error::MqttError;

/// Publishes through the request channel of a connected [`AsyncClient`].
///
/// Cloning is cheap; every clone feeds the same event loop.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Wrap an existing client handle.
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl BusPublisher for MqttPublisher {
    fn publish(
        &self,
        topic: String,
        payload: Vec<u8>,
        retain: bool,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        async move {
            tracing::trace!(%topic, retain, "publishing");
            self.client
                .publish(topic, QoS::AtMostOnce, retain, payload)
                .await
                .map_err(|err| MqttError::from(err).into_domain())
        }
    }
}
