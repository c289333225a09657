//! MQTT connection configuration.

use serde::Deserialize;

/// Configuration for the broker connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Optional broker username. Only used together with `password`.
    pub username: Option<String>,
    /// Optional broker password. Only used together with `username`.
    pub password: Option<String>,
    /// Topic root every bridge topic lives under.
    pub topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Capacity of the client request and bus event channels.
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "hue-mqtt-bridge".to_string(),
            username: None,
            password: None,
            topic: "hue".to_string(),
            keep_alive_secs: 30,
            channel_capacity: 64,
        }
    }
}

impl MqttConfig {
    /// Broker credentials, when both halves are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}
