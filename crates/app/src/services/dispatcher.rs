//! Command dispatcher — maps bus commands onto device-bridge mutations.
//!
//! Nothing is ever reported back onto the bus: every way a command can end
//! is captured in a [`CommandOutcome`] and logged.

use huemqtt_domain::command::{Command, parse_light_payload};
use huemqtt_domain::error::{HueMqttError, NotFoundError, ValidationError};
use huemqtt_domain::group::GroupId;
use huemqtt_domain::light::LightStateUpdate;

use crate::ports::BridgeClient;
use crate::registry::EntityRegistry;
use crate::scheduler::PollScheduler;

/// How a bus message was handled.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The bridge accepted the mutation; a poll cycle should follow.
    Applied(LightStateUpdate),
    /// The payload was malformed or out of range; no device call was made.
    Rejected(ValidationError),
    /// The named light or group is not in the registry.
    UnknownEntity(NotFoundError),
    /// The bridge call failed; it is not retried.
    DeviceFailed(HueMqttError),
    /// The bridge is not paired yet; the message was dropped.
    NotPaired,
    /// The topic is not part of the command surface.
    Unrecognised,
    /// A group command for an existing group. Group commands are accepted
    /// but have no effect.
    GroupInert,
}

impl CommandOutcome {
    /// Whether the command reached the bridge successfully.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Stateless dispatcher; all state it needs is lent by the runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Handle one command against an authorised bridge.
    ///
    /// The pending poll is cancelled right before any device call so a poll
    /// started earlier cannot overwrite the command's effect with stale data.
    /// It is not cancelled for commands that are discarded.
    pub async fn dispatch<B: BridgeClient>(
        &self,
        bridge: &B,
        registry: &EntityRegistry,
        scheduler: &mut PollScheduler,
        command: Command,
    ) -> CommandOutcome {
        match command {
            Command::SetLight { name, payload } => {
                Self::set_light(bridge, registry, scheduler, &name, &payload).await
            }
            Command::SetGroup { name, .. } => Self::set_group(registry, &name),
            Command::AllOff => {
                tracing::info!("switching all lights off");
                Self::set_all(bridge, scheduler, LightStateUpdate::off()).await
            }
            Command::AllOn => {
                tracing::info!("switching all lights on");
                Self::set_all(bridge, scheduler, LightStateUpdate::on()).await
            }
        }
    }

    async fn set_light<B: BridgeClient>(
        bridge: &B,
        registry: &EntityRegistry,
        scheduler: &mut PollScheduler,
        name: &str,
        payload: &[u8],
    ) -> CommandOutcome {
        let Some(light) = registry.light(name) else {
            tracing::warn!(light = %name, "light does not exist");
            return CommandOutcome::UnknownEntity(NotFoundError {
                entity: "light",
                name: name.to_string(),
            });
        };

        let update = match parse_light_payload(payload) {
            Ok(update) => update,
            Err(err) => {
                tracing::warn!(light = %name, %err, "discarding light command");
                return CommandOutcome::Rejected(err);
            }
        };

        tracing::info!(light = %name, id = %light.id, ?update, "setting light state");
        scheduler.cancel();
        match bridge.set_light_state(light.id, &update).await {
            Ok(()) => CommandOutcome::Applied(update),
            Err(err) => {
                tracing::error!(light = %name, error = %err, "failed to set light state");
                CommandOutcome::DeviceFailed(err)
            }
        }
    }

    fn set_group(registry: &EntityRegistry, name: &str) -> CommandOutcome {
        if registry.group(name).is_some() {
            tracing::debug!(group = %name, "group commands have no effect");
            CommandOutcome::GroupInert
        } else {
            tracing::warn!(group = %name, "group does not exist");
            CommandOutcome::UnknownEntity(NotFoundError {
                entity: "group",
                name: name.to_string(),
            })
        }
    }

    async fn set_all<B: BridgeClient>(
        bridge: &B,
        scheduler: &mut PollScheduler,
        update: LightStateUpdate,
    ) -> CommandOutcome {
        scheduler.cancel();
        match bridge.set_group_state(GroupId::ALL_LIGHTS, &update).await {
            Ok(()) => CommandOutcome::Applied(update),
            Err(err) => {
                tracing::error!(error = %err, "failed to set state of all lights");
                CommandOutcome::DeviceFailed(err)
            }
        }
    }
}
