//! Lights — snapshots reported by the bridge, state updates sent to it, and
//! the retained status payload published for each light.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::{Timestamp, epoch_millis};

/// Bridge-internal numeric identifier of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightId(pub u32);

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LightId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// The raw `state` object of a light, kept verbatim so that change detection
/// is a deep structural comparison of everything the bridge reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightState(pub Map<String, Value>);

impl LightState {
    /// Whether the light reports `on: true`.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.flag("on")
    }

    /// Whether the light reports `reachable: true`.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.flag("reachable")
    }

    /// The reported `bri` value, if it is a non-negative integer.
    #[must_use]
    pub fn brightness(&self) -> Option<u64> {
        self.0.get("bri").and_then(Value::as_u64)
    }

    fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

impl From<Value> for LightState {
    /// Non-object values yield an empty state.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Last-observed snapshot of one light.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub id: LightId,
    /// Display name as configured on the bridge.
    pub name: String,
    pub state: LightState,
}

/// Options sent to the bridge to change a light (or a group's action).
///
/// Absent fields are left out of the request body. Values taken from a
/// structured command payload are forwarded verbatim, whatever their JSON
/// type, and the bridge is left to judge them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightStateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<Value>,
    #[serde(default, alias = "brightness", skip_serializing_if = "Option::is_none")]
    pub bri: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Value>,
    #[serde(default, alias = "transitionTime", skip_serializing_if = "Option::is_none")]
    pub transitiontime: Option<Value>,
}

impl LightStateUpdate {
    /// `{on: false}`
    #[must_use]
    pub fn off() -> Self {
        Self {
            on: Some(Value::Bool(false)),
            ..Self::default()
        }
    }

    /// `{on: true}`
    #[must_use]
    pub fn on() -> Self {
        Self {
            on: Some(Value::Bool(true)),
            ..Self::default()
        }
    }

    /// `{on: true, bri: value}`
    #[must_use]
    pub fn on_at(brightness: u8) -> Self {
        Self {
            on: Some(Value::Bool(true)),
            bri: Some(Value::from(brightness)),
            ..Self::default()
        }
    }
}

/// Retained payload published on `{root}/status/light/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightStatus {
    /// Brightness when the light is on and reachable, `0` otherwise.
    pub val: u64,
    /// The full raw state as reported by the bridge.
    pub hue_state: LightState,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

impl LightStatus {
    /// Build the status payload for `light` observed at `at`.
    #[must_use]
    pub fn new(light: &Light, at: Timestamp) -> Self {
        let state = &light.state;
        let val = if state.is_on() && state.is_reachable() {
            state.brightness().unwrap_or(0)
        } else {
            0
        };
        Self {
            val,
            hue_state: state.clone(),
            ts: epoch_millis(at),
        }
    }
}
