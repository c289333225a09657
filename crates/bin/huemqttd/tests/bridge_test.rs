//! End-to-end tests for the bridge stack.
//!
//! Each test wires the real JSON state file, pairing service and runtime
//! against in-memory bridge and bus ports. No network is touched.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use huemqtt_adapter_storage_json::JsonFileStore;
use huemqtt_app::ports::{BridgeClient, BridgePairing, BusEvent, BusPublisher, DiscoveredBridge};
use huemqtt_app::runtime::BridgeRuntime;
use huemqtt_app::services::pairing::{DEFAULT_DEVICE_TYPE, PairingError, PairingService};
use huemqtt_app::services::poller::PollSettings;
use huemqtt_domain::credentials::{CredentialRecord, Credentials};
use huemqtt_domain::error::HueMqttError;
use huemqtt_domain::group::{Group, GroupId};
use huemqtt_domain::light::{Light, LightId, LightState, LightStateUpdate};
use huemqtt_domain::topic::Topics;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakePairing {
    calls: Mutex<Vec<String>>,
}

impl FakePairing {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl BridgePairing for FakePairing {
    fn discover(&self) -> impl Future<Output = Result<Vec<DiscoveredBridge>, HueMqttError>> + Send {
        self.calls.lock().unwrap().push("discover".to_string());
        async {
            Ok(vec![DiscoveredBridge {
                id: "001788fffe100491".to_string(),
                address: "192.168.2.23".to_string(),
            }])
        }
    }

    fn register(
        &self,
        address: &str,
        device_type: &str,
    ) -> impl Future<Output = Result<String, HueMqttError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push(format!("register {address} {device_type}"));
        async { Ok("issued-user".to_string()) }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Light(LightId, LightStateUpdate),
    Group(GroupId, LightStateUpdate),
}

struct FakeBridge {
    lights: Mutex<Vec<Light>>,
    calls: Mutex<Vec<Call>>,
    fetches: Mutex<usize>,
}

impl FakeBridge {
    fn new(lights: Vec<Light>) -> Self {
        Self {
            lights: Mutex::new(lights),
            calls: Mutex::new(Vec::new()),
            fetches: Mutex::new(0),
        }
    }

    /// Apply `{on}` to the stored light so the next fetch reports it.
    fn record(&self, call: Call) {
        if let Call::Light(id, update) = &call {
            let mut lights = self.lights.lock().unwrap();
            if let (Some(light), Some(on)) = (lights.iter_mut().find(|l| l.id == *id), update.on.as_ref()) {
                light.state.0.insert("on".to_string(), on.clone());
            }
        }
        self.calls.lock().unwrap().push(call);
    }
}

impl BridgeClient for FakeBridge {
    fn lights(&self) -> impl Future<Output = Result<Vec<Light>, HueMqttError>> + Send {
        *self.fetches.lock().unwrap() += 1;
        let lights = self.lights.lock().unwrap().clone();
        async { Ok(lights) }
    }

    fn groups(&self) -> impl Future<Output = Result<Vec<Group>, HueMqttError>> + Send {
        async { Ok(Vec::new()) }
    }

    fn set_light_state(
        &self,
        id: LightId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        self.record(Call::Light(id, update.clone()));
        async { Ok(()) }
    }

    fn set_group_state(
        &self,
        id: GroupId,
        update: &LightStateUpdate,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        self.record(Call::Group(id, update.clone()));
        async { Ok(()) }
    }
}

#[derive(Default)]
struct RecordingBus {
    published: Mutex<Vec<(String, String, bool)>>,
}

impl RecordingBus {
    fn published(&self) -> Vec<(String, String, bool)> {
        self.published.lock().unwrap().clone()
    }

    fn last_on(&self, topic: &str) -> Option<String> {
        self.published()
            .into_iter()
            .rev()
            .find(|(t, _, _)| t == topic)
            .map(|(_, payload, _)| payload)
    }
}

impl BusPublisher for RecordingBus {
    fn publish(
        &self,
        topic: String,
        payload: Vec<u8>,
        retain: bool,
    ) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        self.published
            .lock()
            .unwrap()
            .push((topic, String::from_utf8(payload).unwrap(), retain));
        async { Ok(()) }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn state_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("huemqttd-{}", uuid::Uuid::new_v4()))
        .join("local.json")
}

fn lamp(on: bool) -> Light {
    Light {
        id: LightId(3),
        name: "Lamp1".to_string(),
        state: LightState::from(json!({"on": on, "reachable": true, "bri": 144})),
    }
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

fn message(topic: &str, payload: &str) -> BusEvent {
    BusEvent::Message {
        topic: topic.to_string(),
        payload: payload.as_bytes().to_vec(),
    }
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_persist_pairing_and_reuse_it_on_restart() {
    let path = state_file();

    let first = PairingService::new(
        FakePairing::default(),
        JsonFileStore::new(&path),
        DEFAULT_DEVICE_TYPE,
    );
    let credentials = first
        .ensure_credentials(CredentialRecord::default())
        .await
        .unwrap();
    assert_eq!(
        credentials,
        Credentials {
            address: "192.168.2.23".to_string(),
            username: "issued-user".to_string(),
        }
    );

    let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(
        raw,
        json!({"hue": {"ip": "192.168.2.23", "username": "issued-user"}})
    );

    let pairing = Arc::new(FakePairing::default());
    let second = PairingService::new(
        Arc::clone(&pairing),
        JsonFileStore::new(&path),
        DEFAULT_DEVICE_TYPE,
    );
    let again = second
        .ensure_credentials(CredentialRecord::default())
        .await
        .unwrap();

    assert_eq!(again, credentials);
    assert!(pairing.calls().is_empty());
}

#[tokio::test]
async fn should_register_configured_address_without_discovery() {
    let path = state_file();
    let pairing = Arc::new(FakePairing::default());
    let service = PairingService::new(
        Arc::clone(&pairing),
        JsonFileStore::new(&path),
        "living-room",
    );

    let credentials = service
        .ensure_credentials(CredentialRecord {
            address: Some("10.0.0.7".to_string()),
            username: None,
        })
        .await
        .unwrap();

    assert_eq!(credentials.address, "10.0.0.7");
    assert_eq!(pairing.calls(), vec!["register 10.0.0.7 living-room"]);
    let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["hue"]["ip"], "10.0.0.7");
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_pair_then_switch_light_off_and_republish() {
    let path = state_file();
    let bus = Arc::new(RecordingBus::default());
    let bridge = Arc::new(FakeBridge::new(vec![lamp(true)]));
    let runtime = BridgeRuntime::new(
        Topics::new("hue").unwrap(),
        Arc::clone(&bus),
        PollSettings::default(),
    );
    let service = PairingService::new(
        FakePairing::default(),
        JsonFileStore::new(&path),
        DEFAULT_DEVICE_TYPE,
    );
    let paired_bridge = Arc::clone(&bridge);
    let pairing = async move {
        service.ensure_credentials(CredentialRecord::default()).await?;
        Ok::<_, PairingError>(paired_bridge)
    };
    let (tx, rx) = mpsc::channel(16);

    let driver = async {
        tx.send(BusEvent::Connected).await.unwrap();
        wait_until(|| bus.last_on("hue/status/light/lamp1").is_some()).await;
        assert_eq!(bus.last_on("hue/connected").as_deref(), Some("2"));
        let status: Value =
            serde_json::from_str(&bus.last_on("hue/status/light/lamp1").unwrap()).unwrap();
        assert_eq!(status["val"], 144);

        tx.send(message("hue/set/light/lamp1", "0")).await.unwrap();
        wait_until(|| *bridge.fetches.lock().unwrap() == 2).await;
        drop(tx);
    };
    let (result, ()) = tokio::join!(runtime.run(pairing, rx), driver);
    result.unwrap();

    assert_eq!(
        *bridge.calls.lock().unwrap(),
        vec![Call::Light(LightId(3), LightStateUpdate::off())]
    );
    let status: Value =
        serde_json::from_str(&bus.last_on("hue/status/light/lamp1").unwrap()).unwrap();
    assert_eq!(status["val"], 0);
    assert_eq!(status["hue_state"]["on"], false);
    assert!(bus.published().iter().all(|(_, _, retain)| *retain));
    assert!(path.exists());
}

#[tokio::test]
async fn should_turn_all_lights_off_through_group_zero() {
    let bus = Arc::new(RecordingBus::default());
    let bridge = Arc::new(FakeBridge::new(vec![lamp(true)]));
    let mut runtime = BridgeRuntime::new(
        Topics::new("home/hue").unwrap(),
        Arc::clone(&bus),
        PollSettings::default(),
    );
    runtime.attach(Arc::clone(&bridge)).await;

    let outcome = runtime
        .handle_event(message("home/hue/lightsout", ""))
        .await
        .unwrap();

    assert!(outcome.is_applied());
    assert_eq!(
        *bridge.calls.lock().unwrap(),
        vec![Call::Group(GroupId::ALL_LIGHTS, LightStateUpdate::off())]
    );
    assert_eq!(*bridge.fetches.lock().unwrap(), 2);
}

#[tokio::test]
async fn should_stop_with_registration_exit_code() {
    struct RefusingPairing;

    impl BridgePairing for RefusingPairing {
        fn discover(
            &self,
        ) -> impl Future<Output = Result<Vec<DiscoveredBridge>, HueMqttError>> + Send {
            async { Ok(Vec::new()) }
        }

        fn register(
            &self,
            _address: &str,
            _device_type: &str,
        ) -> impl Future<Output = Result<String, HueMqttError>> + Send {
            async {
                Err(HueMqttError::Device(Box::new(std::io::Error::other(
                    "link button not pressed",
                ))))
            }
        }
    }

    let bus = Arc::new(RecordingBus::default());
    let runtime: BridgeRuntime<Arc<FakeBridge>, _> = BridgeRuntime::new(
        Topics::new("hue").unwrap(),
        Arc::clone(&bus),
        PollSettings::default(),
    );
    let service = PairingService::new(
        RefusingPairing,
        JsonFileStore::new(state_file()),
        DEFAULT_DEVICE_TYPE,
    );
    let pairing = async move {
        service
            .ensure_credentials(CredentialRecord {
                address: Some("10.0.0.7".to_string()),
                username: None,
            })
            .await?;
        Ok::<Arc<FakeBridge>, PairingError>(Arc::new(FakeBridge::new(Vec::new())))
    };
    let (_tx, rx) = mpsc::channel(4);

    let err = runtime.run(pairing, rx).await.unwrap_err();

    assert!(matches!(err, PairingError::Registration { .. }));
    assert_eq!(err.exit_code(), 11);
    assert!(bus.published().is_empty());
}
