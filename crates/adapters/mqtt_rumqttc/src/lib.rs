//! # huemqtt-adapter-mqtt-rumqttc
//!
//! MQTT adapter — the bus side of the bridge.
//!
//! ## Responsibilities
//! - Connect to the broker with a retained last will on `{root}/connected`
//! - Subscribe to the command topics on every `ConnAck`
//! - Forward connection changes and inbound publishes as [`BusEvent`]s
//! - Implement [`BusPublisher`] on top of `rumqttc::AsyncClient`
//!
//! ## Dependency rule
//! Same as other adapters: depends on `huemqtt-app` and `huemqtt-domain`.
//!
//! [`BusEvent`]: huemqtt_app::ports::BusEvent
//! [`BusPublisher`]: huemqtt_app::ports::BusPublisher

pub mod config;
pub mod connection;
pub mod error;
pub mod publisher;

pub use config::MqttConfig;
pub use connection::{MqttConnection, connect};
pub use error::MqttError;
pub use publisher::MqttPublisher;
