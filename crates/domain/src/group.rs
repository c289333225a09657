//! Groups — bridge-side collections of lights.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::{Timestamp, epoch_millis};

/// Bridge-internal numeric identifier of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl GroupId {
    /// The special group containing every light known to the bridge.
    pub const ALL_LIGHTS: Self = Self(0);
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for GroupId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Last-observed snapshot of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Identifiers of member lights, as reported by the bridge.
    pub lights: Vec<String>,
    /// Last action applied to the group.
    pub action: Map<String, Value>,
    /// Aggregate state (`all_on`, `any_on`).
    pub state: Map<String, Value>,
}

/// Retained payload published on `{root}/status/group/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatus {
    pub action: Map<String, Value>,
    pub state: Map<String, Value>,
    pub lights: Vec<String>,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

impl GroupStatus {
    /// Build the status payload for `group` observed at `at`.
    #[must_use]
    pub fn new(group: &Group, at: Timestamp) -> Self {
        Self {
            action: group.action.clone(),
            state: group.state.clone(),
            lights: group.lights.clone(),
            ts: epoch_millis(at),
        }
    }
}
