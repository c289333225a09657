//! In-memory port implementations shared by the service tests.

use std::future::Future;
use std::sync::Mutex;

use serde_json::Value;

use huemqtt_domain::error::HueMqttError;
use huemqtt_domain::group::{Group, GroupId};
use huemqtt_domain::light::{Light, LightId, LightState, LightStateUpdate};

use crate::ports::{BridgeClient, BusPublisher};

pub fn device_error() -> HueMqttError {
    HueMqttError::Device(Box::new(std::io::Error::other("bridge unreachable")))
}

pub fn light(id: u32, name: &str, state: Value) -> Light {
    Light {
        id: LightId(id),
        name: name.to_string(),
        state: LightState::from(state),
    }
}

pub fn group(id: u32, name: &str, lights: &[&str]) -> Group {
    Group {
        id: GroupId(id),
        name: name.to_string(),
        lights: lights.iter().map(ToString::to_string).collect(),
        action: serde_json::json!({"on": false})
            .as_object()
            .cloned()
            .unwrap_or_default(),
        state: serde_json::json!({"all_on": false, "any_on": false})
            .as_object()
            .cloned()
            .unwrap_or_default(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    Light(LightId, LightStateUpdate),
    Group(GroupId, LightStateUpdate),
}

#[derive(Default)]
struct BridgeState {
    lights: Vec<Light>,
    groups: Vec<Group>,
    fail_lights: bool,
    fail_groups: bool,
    fail_mutations: bool,
    calls: Vec<BridgeCall>,
    light_fetches: usize,
    group_fetches: usize,
}

#[derive(Default)]
pub struct FakeBridge {
    state: Mutex<BridgeState>,
}

impl FakeBridge {
    pub fn with(lights: Vec<Light>, groups: Vec<Group>) -> Self {
        Self {
            state: Mutex::new(BridgeState {
                lights,
                groups,
                ..BridgeState::default()
            }),
        }
    }

    pub fn set_lights(&self, lights: Vec<Light>) {
        self.state.lock().unwrap().lights = lights;
    }

    pub fn fail_lights(&self, fail: bool) {
        self.state.lock().unwrap().fail_lights = fail;
    }

    pub fn fail_groups(&self, fail: bool) {
        self.state.lock().unwrap().fail_groups = fail;
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.state.lock().unwrap().fail_mutations = fail;
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn light_fetches(&self) -> usize {
        self.state.lock().unwrap().light_fetches
    }

    pub fn group_fetches(&self) -> usize {
        self.state.lock().unwrap().group_fetches
    }

    fn mutate(&self, call: BridgeCall) -> Result<(), HueMqttError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_mutations {
            Err(device_error())
        } else {
            Ok(())
        }
    }
}

impl BridgeClient for FakeBridge {
    fn lights(&self) -> impl Future<Output = Result<Vec<Light>, HueMqttError>> + Send {
        let mut state = self.state.lock().unwrap();
        state.light_fetches += 1;
        let result = if state.fail_lights {
            Err(device_error())
        } else {
            Ok(state.lights.clone())
        };
        async { result }
    }

    fn groups(&self) -> impl Future<Output = Result<Vec<Group>, HueMqttError>> + Send {
        let mut state = self.state.lock().unwrap();
        state.group_fetches += 1;
        let result = if state.fail_groups {
            Err(device_error())
        } else {
            Ok(state.groups.clone())
        };
        async { result }
    }

    fn set_light_state(
        &self,
        id: LightId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        let result = self.mutate(BridgeCall::Light(id, update.clone()));
        async { result }
    }

    fn set_group_state(
        &self,
        id: GroupId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        let result = self.mutate(BridgeCall::Group(id, update.clone()));
        async { result }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

impl Published {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.payload).unwrap()
    }
}

#[derive(Default)]
pub struct RecordingBus {
    published: Mutex<Vec<Published>>,
}

impl RecordingBus {
    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.published().into_iter().map(|p| p.topic).collect()
    }

    pub fn take(&self) -> Vec<Published> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }
}

impl BusPublisher for RecordingBus {
    fn publish(
        &self,
        topic: String,
        payload: Vec<u8>,
        retain: bool,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        self.published.lock().unwrap().push(Published {
            topic,
            payload: String::from_utf8(payload).unwrap(),
            retain,
        });
        async { Ok(()) }
    }
}
