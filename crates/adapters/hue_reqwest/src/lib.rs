//! # huemqtt-adapter-hue-reqwest
//!
//! Hue bridge adapter speaking the v1 local REST API.
//!
//! ## Responsibilities
//! - [`HueClient`] implements `BridgeClient`: `GET /api/{user}/lights`,
//!   `GET /api/{user}/groups`, `PUT …/lights/{id}/state` and
//!   `PUT …/groups/{id}/action`
//! - [`HuePairing`] implements `BridgePairing`: N-UPnP discovery and
//!   `POST /api` user registration
//! - Surface `[{"error": …}]` bodies, which the bridge sends with HTTP 200,
//!   as typed [`HueError`]s
//!
//! ## Dependency rule
//! Same as other adapters: depends on `huemqtt-app` and `huemqtt-domain`.

pub mod client;
pub mod config;
pub mod error;
pub mod pairing;
pub mod wire;

pub use client::HueClient;
pub use config::HueClientConfig;
pub use error::HueError;
pub use pairing::HuePairing;
