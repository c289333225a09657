//! MQTT adapter error types.

use huemqtt_domain::error::{HueMqttError, ValidationError};

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The configured topic root cannot be used.
    #[error("invalid topic root")]
    Topic(#[source] ValidationError),

    /// The rumqttc client rejected a request.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),
}

impl MqttError {
    /// Convert into a [`HueMqttError`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> HueMqttError {
        match self {
            Self::Topic(err) => HueMqttError::Validation(err),
            other => HueMqttError::Bus(Box::new(other)),
        }
    }
}

impl From<MqttError> for HueMqttError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}

impl From<rumqttc::ClientError> for MqttError {
    fn from(err: rumqttc::ClientError) -> Self {
        Self::Client(err)
    }
}
