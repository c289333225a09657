//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod bridge;
pub mod bus;
pub mod pairing;
pub mod storage;

pub use bridge::BridgeClient;
pub use bus::{BusEvent, BusPublisher};
pub use pairing::{BridgePairing, DiscoveredBridge};
pub use storage::CredentialStore;
