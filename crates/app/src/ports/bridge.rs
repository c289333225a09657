//! Device-bridge port — state fetching and state mutation on an authorised
//! bridge connection.

use std::future::Future;

use huemqtt_domain::error::HueMqttError;
use huemqtt_domain::group::{Group, GroupId};
use huemqtt_domain::light::{Light, LightId, LightStateUpdate};

/// An authorised connection to the device bridge.
///
/// Failures are reported as [`HueMqttError::Device`]; callers never retry.
pub trait BridgeClient {
    /// Fetch every light with its current state.
    fn lights(&self) -> impl Future<Output = Result<Vec<Light>, HueMqttError>> + Send;

    /// Fetch every group.
    fn groups(&self) -> impl Future<Output = Result<Vec<Group>, HueMqttError>> + Send;

    /// Apply `update` to one light.
    fn set_light_state(
        &self,
        id: LightId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send;

    /// Apply `update` to every light of a group.
    fn set_group_state(
        &self,
        id: GroupId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send;
}

impl<T: BridgeClient + Send + Sync> BridgeClient for std::sync::Arc<T> {
    fn lights(&self) -> impl Future<Output = Result<Vec<Light>, HueMqttError>> + Send {
        (**self).lights()
    }

    fn groups(&self) -> impl Future<Output = Result<Vec<Group>, HueMqttError>> + Send {
        (**self).groups()
    }

    fn set_light_state(
        &self,
        id: LightId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        (**self).set_light_state(id, update)
    }

    fn set_group_state(
        &self,
        id: GroupId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        (**self).set_group_state(id, update)
    }
}
