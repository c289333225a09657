//! Entity registry — the last-observed snapshot of every light and group,
//! keyed by normalised name.
//!
//! Each collection is an immutable map behind an [`Arc`]. A poll cycle builds
//! a fresh map and swaps it in whole; readers holding an older [`Arc`] keep a
//! consistent view. Only the state poller writes (the setters are
//! crate-private).

use std::collections::HashMap;
use std::sync::Arc;

use huemqtt_domain::group::Group;
use huemqtt_domain::light::Light;

/// Lights keyed by normalised name.
pub type LightMap = HashMap<String, Light>;

/// Groups keyed by normalised name.
pub type GroupMap = HashMap<String, Group>;

/// Snapshot store shared by the dispatcher (read) and the poller (write).
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    lights: Arc<LightMap>,
    groups: Arc<GroupMap>,
}

impl EntityRegistry {
    /// Resolve a light by normalised name.
    #[must_use]
    pub fn light(&self, name: &str) -> Option<&Light> {
        self.lights.get(name)
    }

    /// Resolve a group by normalised name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Current light snapshot.
    #[must_use]
    pub fn lights(&self) -> Arc<LightMap> {
        Arc::clone(&self.lights)
    }

    /// Current group snapshot.
    #[must_use]
    pub fn groups(&self) -> Arc<GroupMap> {
        Arc::clone(&self.groups)
    }

    pub(crate) fn replace_lights(&mut self, lights: LightMap) {
        self.lights = Arc::new(lights);
    }

    pub(crate) fn replace_groups(&mut self, groups: GroupMap) {
        self.groups = Arc::new(groups);
    }
}
