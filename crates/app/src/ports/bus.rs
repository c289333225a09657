//! Message-bus port — retained publishing and the inbound event stream.

use std::future::Future;

use huemqtt_domain::error::HueMqttError;

/// Publishes messages onto the bus.
pub trait BusPublisher {
    /// Publish `payload` on `topic`, optionally retained by the broker.
    fn publish(
        &self,
        topic: String,
        payload: Vec<u8>,
        retain: bool,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send;
}

impl<T: BusPublisher + Send + Sync> BusPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: String,
        payload: Vec<u8>,
        retain: bool,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        (**self).publish(topic, payload, retain)
    }
}

/// Something that happened on the bus connection, delivered in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// The broker accepted the connection (first connect or reconnect).
    Connected,
    /// The connection dropped; the adapter keeps reconnecting.
    Disconnected,
    /// A message arrived on a subscribed topic.
    Message { topic: String, payload: Vec<u8> },
}
