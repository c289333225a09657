//! # huemqtt-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `BridgeClient` — read and mutate lights and groups on the bridge
//!   - `BridgePairing` — discover bridges and register an application
//!   - `BusPublisher` — publish to the message bus
//!   - `CredentialStore` — load and save the local state file
//! - Provide the use-cases:
//!   - `PairingService` — obtain credentials before any bridge traffic
//!   - `CommandDispatcher` — turn bus commands into bridge calls
//!   - `StatePoller` — mirror bridge state onto status topics
//!   - `BridgeRuntime` — the single event loop driving all of the above
//!
//! ## Dependency rule
//! Depends on `huemqtt-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod registry;
pub mod runtime;
pub mod scheduler;
pub mod services;

#[cfg(test)]
mod testing;
