//! Pairing port — locating a device bridge and obtaining an application
//! credential from it.

use std::future::Future;

use huemqtt_domain::error::HueMqttError;

/// A bridge found by network discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBridge {
    /// Bridge identifier as reported by the discovery service.
    pub id: String,
    /// Address reachable on the local network.
    pub address: String,
}

/// Discovery and registration against unauthenticated bridge endpoints.
pub trait BridgePairing {
    /// Look for bridges on the local network.
    fn discover(&self) -> impl Future<Output = Result<Vec<DiscoveredBridge>, HueMqttError>> + Send;

    /// Register an application named `device_type` with the bridge at
    /// `address`, returning the issued username.
    fn register(
        &self,
        address: &str,
        device_type: &str,
    ) -> impl Future<Output = Result<String, HueMqttError>> + Send;
}

impl<T: BridgePairing + Send + Sync> BridgePairing for std::sync::Arc<T> {
    fn discover(&self) -> impl Future<Output = Result<Vec<DiscoveredBridge>, HueMqttError>> + Send {
        (**self).discover()
    }

    fn register(
        &self,
        address: &str,
        device_type: &str,
    ) -> impl Future<Output = Result<String, HueMqttError>> + Send {
        (**self).register(address, device_type)
    }
}
