//! Connectivity status publisher.

use huemqtt_domain::connectivity::ConnectivityStatus;
use huemqtt_domain::error::HueMqttError;
use huemqtt_domain::topic::Topics;

use crate::ports::BusPublisher;

/// Publishes the retained `{root}/connected` value.
pub struct ConnectivityPublisher<P> {
    publisher: P,
    topic: String,
}

impl<P: BusPublisher> ConnectivityPublisher<P> {
    /// Create a publisher for the connectivity topic under `topics`.
    pub fn new(publisher: P, topics: &Topics) -> Self {
        Self {
            publisher,
            topic: topics.connected(),
        }
    }

    /// Publish `status`, retained.
    ///
    /// # Errors
    ///
    /// Returns the bus error when the publish could not be queued.
    pub async fn publish(&self, status: ConnectivityStatus) -> Result<(), HueMqttError> {
        tracing::debug!(%status, "publishing connectivity status");
        self.publisher
            .publish(self.topic.clone(), status.as_payload().into(), true)
            .await
    }
}
