//! # huemqtt-domain
//!
//! Pure domain model for the Hue ⇄ MQTT bridge.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, entity-name normalisation
//! - Describe the **topic surface** (`{root}/set/light/{name}`, `{root}/status/…`)
//! - Parse inbound **commands** and their payloads into device state updates
//! - Model **light** and **group** snapshots as reported by the bridge, and
//!   the retained **status payloads** built from them
//! - Model the persisted **credentials record** and the **connectivity** value
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod name;
pub mod time;

pub mod command;
pub mod connectivity;
pub mod credentials;
pub mod group;
pub mod light;
pub mod topic;
