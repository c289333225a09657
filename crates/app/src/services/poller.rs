//! State poller — fetches bridge state, publishes what changed, and
//! reschedules itself.
//!
//! Lights are diffed against the registry and only new or changed lights are
//! published. Groups are republished every cycle, changed or not.

use std::time::Duration;

use serde::Serialize;

use huemqtt_domain::group::{Group, GroupStatus};
use huemqtt_domain::light::{Light, LightStatus};
use huemqtt_domain::name::normalize;
use huemqtt_domain::time::{Timestamp, now};
use huemqtt_domain::topic::Topics;

use crate::ports::{BridgeClient, BusPublisher};
use crate::registry::{EntityRegistry, GroupMap, LightMap};
use crate::scheduler::PollScheduler;

/// Poller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between the end of a lights sub-cycle and the next poll.
    pub refresh_interval: Duration,
    /// Keep polling after a failed lights fetch instead of stalling until the
    /// next command.
    pub reschedule_on_failure: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(15),
            reschedule_on_failure: false,
        }
    }
}

/// Result of one sub-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubCycle {
    /// The fetch succeeded and `count` status messages were published.
    Published { count: usize },
    /// The fetch failed; nothing was published and the registry is untouched.
    FetchFailed,
}

/// What one poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub lights: SubCycle,
    pub groups: SubCycle,
    /// Whether the next poll was scheduled.
    pub rescheduled: bool,
}

/// Outcome of comparing a fresh light listing with the previous snapshot.
#[derive(Debug)]
pub struct LightsDiff {
    /// The replacement snapshot, keyed by normalised name.
    pub snapshot: LightMap,
    /// Status payloads for new or changed lights, keyed by normalised name.
    pub changed: Vec<(String, LightStatus)>,
}

/// Compare `fetched` against `previous` by deep equality of each light's
/// `state`.
#[must_use]
pub fn diff_lights(previous: &LightMap, fetched: Vec<Light>, at: Timestamp) -> LightsDiff {
    let mut snapshot = LightMap::with_capacity(fetched.len());
    let mut changed = Vec::new();
    for light in fetched {
        let name = normalize(&light.name);
        let unchanged = previous
            .get(&name)
            .is_some_and(|known| known.state == light.state);
        if !unchanged {
            changed.push((name.clone(), LightStatus::new(&light, at)));
        }
        snapshot.insert(name, light);
    }
    LightsDiff { snapshot, changed }
}

/// Publishes light and group status on the bus.
pub struct StatePoller<P> {
    publisher: P,
    topics: Topics,
    settings: PollSettings,
}

impl<P: BusPublisher> StatePoller<P> {
    /// Create a poller publishing through `publisher` under `topics`.
    pub fn new(publisher: P, topics: Topics, settings: PollSettings) -> Self {
        Self {
            publisher,
            topics,
            settings,
        }
    }

    /// Run the lights sub-cycle then the groups sub-cycle.
    pub async fn run_cycle<B: BridgeClient>(
        &self,
        bridge: &B,
        registry: &mut EntityRegistry,
        scheduler: &mut PollScheduler,
    ) -> PollReport {
        let lights = self.poll_lights(bridge, registry).await;
        let rescheduled =
            matches!(lights, SubCycle::Published { .. }) || self.settings.reschedule_on_failure;
        if rescheduled {
            scheduler.schedule(self.settings.refresh_interval);
        }
        let groups = self.poll_groups(bridge, registry).await;
        let report = PollReport {
            lights,
            groups,
            rescheduled,
        };
        tracing::debug!(?report, "poll cycle complete");
        report
    }

    async fn poll_lights<B: BridgeClient>(
        &self,
        bridge: &B,
        registry: &mut EntityRegistry,
    ) -> SubCycle {
        tracing::debug!("polling light state");
        let fetched = match bridge.lights().await {
            Ok(lights) => lights,
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch lights");
                return SubCycle::FetchFailed;
            }
        };

        let diff = diff_lights(&registry.lights(), fetched, now());
        let mut count = 0;
        for (name, status) in &diff.changed {
            if self.publish(self.topics.light_status(name), status).await {
                count += 1;
            }
        }
        registry.replace_lights(diff.snapshot);
        SubCycle::Published { count }
    }

    async fn poll_groups<B: BridgeClient>(
        &self,
        bridge: &B,
        registry: &mut EntityRegistry,
    ) -> SubCycle {
        tracing::debug!("polling group state");
        let fetched: Vec<Group> = match bridge.groups().await {
            Ok(groups) => groups,
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch groups");
                return SubCycle::FetchFailed;
            }
        };

        let at = now();
        let mut snapshot = GroupMap::with_capacity(fetched.len());
        let mut count = 0;
        for group in fetched {
            let name = normalize(&group.name);
            let status = GroupStatus::new(&group, at);
            if self.publish(self.topics.group_status(&name), &status).await {
                count += 1;
            }
            snapshot.insert(name, group);
        }
        registry.replace_groups(snapshot);
        SubCycle::Published { count }
    }

    /// Publish `status` retained; failures are logged and reported as `false`.
    async fn publish<T: Serialize>(&self, topic: String, status: &T) -> bool {
        let payload = match serde_json::to_vec(status) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(%topic, %err, "failed to encode status");
                return false;
            }
        };
        tracing::debug!(%topic, "publishing status");
        match self.publisher.publish(topic, payload, true).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "failed to publish status");
                false
            }
        }
    }
}
