//! Pairing service — makes sure a bridge address and an application
//! username exist before any bridge traffic flows.
//!
//! | Known | Action |
//! |-------|--------|
//! | nothing | discover, persist address, register, persist username |
//! | address only | register, persist username |
//! | address and username | nothing |
//!
//! Every failure is fatal and maps to a distinct process exit code.

use huemqtt_domain::credentials::{CredentialRecord, Credentials, LocalState};
use huemqtt_domain::error::HueMqttError;

use crate::ports::{BridgePairing, CredentialStore};

/// Application identifier registered with the bridge by default.
pub const DEFAULT_DEVICE_TYPE: &str = "hue-mqtt-bridge";

/// Fatal pairing failures.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    /// Network discovery failed.
    #[error("bridge discovery failed")]
    Discovery(#[source] HueMqttError),

    /// Network discovery succeeded but found nothing.
    #[error("no bridge found on the network")]
    NoBridgeFound,

    /// The bridge refused or failed to issue an application username.
    #[error("failed to register with the bridge at {address}")]
    Registration {
        address: String,
        #[source]
        source: HueMqttError,
    },

    /// The local state file could not be read or written.
    #[error("failed to access the local state file")]
    Storage(#[source] HueMqttError),
}

impl PairingError {
    /// Process exit status for this failure stage.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Discovery(_) | Self::NoBridgeFound => 10,
            Self::Registration { .. } => 11,
            Self::Storage(_) => 12,
        }
    }
}

/// Drives discovery and registration, persisting each step.
pub struct PairingService<D, S> {
    pairing: D,
    store: S,
    device_type: String,
}

impl<D: BridgePairing, S: CredentialStore> PairingService<D, S> {
    /// Create a service registering as `device_type`.
    pub fn new(pairing: D, store: S, device_type: impl Into<String>) -> Self {
        Self {
            pairing,
            store,
            device_type: device_type.into(),
        }
    }

    /// Produce complete credentials, pairing if needed.
    ///
    /// Values in the local state file take precedence over `configured`.
    ///
    /// # Errors
    ///
    /// Returns a [`PairingError`] naming the stage that failed. Nothing is
    /// retried.
    pub async fn ensure_credentials(
        &self,
        configured: CredentialRecord,
    ) -> Result<Credentials, PairingError> {
        let mut state = self.store.load().await.map_err(PairingError::Storage)?;
        let mut record = state.record().or(configured);
        if let Some(credentials) = record.complete() {
            tracing::info!(address = %credentials.address, "using stored bridge credentials");
            return Ok(credentials);
        }

        let address = match record.address.clone() {
            Some(address) => address,
            None => {
                let address = self.discover().await?;
                record.address = Some(address.clone());
                self.persist(&mut state, &record).await?;
                address
            }
        };

        tracing::info!(%address, device_type = %self.device_type, "registering with bridge");
        let username = self
            .pairing
            .register(&address, &self.device_type)
            .await
            .map_err(|source| PairingError::Registration {
                address: address.clone(),
                source,
            })?;
        record.username = Some(username.clone());
        self.persist(&mut state, &record).await?;
        tracing::info!(%address, "paired with bridge");

        Ok(Credentials { address, username })
    }

    async fn discover(&self) -> Result<String, PairingError> {
        tracing::info!("discovering bridges");
        let bridges = self
            .pairing
            .discover()
            .await
            .map_err(PairingError::Discovery)?;
        let first = bridges.into_iter().next().ok_or(PairingError::NoBridgeFound)?;
        tracing::info!(id = %first.id, address = %first.address, "bridge discovered");
        Ok(first.address)
    }

    async fn persist(
        &self,
        state: &mut LocalState,
        record: &CredentialRecord,
    ) -> Result<(), PairingError> {
        state.apply(record);
        self.store.save(state).await.map_err(PairingError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;

    use super::*;
    use crate::ports::DiscoveredBridge;
    use crate::testing::device_error;

    #[derive(Default)]
    struct FakePairing {
        bridges: Vec<DiscoveredBridge>,
        fail_discovery: bool,
        fail_registration: bool,
        log: Mutex<Vec<String>>,
    }

    impl FakePairing {
        fn with_bridge(address: &str) -> Self {
            Self {
                bridges: vec![
                    DiscoveredBridge {
                        id: "001788fffe000001".to_string(),
                        address: address.to_string(),
                    },
                    DiscoveredBridge {
                        id: "001788fffe000002".to_string(),
                        address: "10.0.0.99".to_string(),
                    },
                ],
                ..Self::default()
            }
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl BridgePairing for FakePairing {
        fn discover(
            &self,
        ) -> impl Future<Output = Result<Vec<DiscoveredBridge>, HueMqttError>> + Send {
            self.log.lock().unwrap().push("discover".to_string());
            let result = if self.fail_discovery {
                Err(device_error())
            } else {
                Ok(self.bridges.clone())
            };
            async { result }
        }

        fn register(
            &self,
            address: &str,
            device_type: &str,
        ) -> impl Future<Output = Result<String, HueMqttError>> + Send {
            self.log
                .lock()
                .unwrap()
                .push(format!("register {address} {device_type}"));
            let result = if self.fail_registration {
                Err(device_error())
            } else {
                Ok("issued-user".to_string())
            };
            async { result }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        state: Mutex<LocalState>,
        saves: Mutex<Vec<LocalState>>,
    }

    impl MemoryStore {
        fn saves(&self) -> Vec<LocalState> {
            self.saves.lock().unwrap().clone()
        }
    }

    impl CredentialStore for MemoryStore {
        fn load(&self) -> impl Future<Output = Result<LocalState, HueMqttError>> + Send {
            let state = self.state.lock().unwrap().clone();
            async { Ok(state) }
        }

        fn save(&self, state: &LocalState) -> impl Future<Output = Result<(), HueMqttError>> + Send {
            *self.state.lock().unwrap() = state.clone();
            self.saves.lock().unwrap().push(state.clone());
            async { Ok(()) }
        }
    }

    fn record(address: Option<&str>, username: Option<&str>) -> CredentialRecord {
        CredentialRecord {
            address: address.map(ToString::to_string),
            username: username.map(ToString::to_string),
        }
    }

    #[tokio::test]
    async fn should_discover_then_register_when_nothing_is_known() {
        let service = PairingService::new(
            FakePairing::with_bridge("10.0.0.2"),
            MemoryStore::default(),
            DEFAULT_DEVICE_TYPE,
        );

        let credentials = service
            .ensure_credentials(CredentialRecord::default())
            .await
            .unwrap();

        assert_eq!(
            credentials,
            Credentials {
                address: "10.0.0.2".to_string(),
                username: "issued-user".to_string(),
            }
        );
        assert_eq!(
            service.pairing.log(),
            vec!["discover", "register 10.0.0.2 hue-mqtt-bridge"]
        );
        let saves = service.store.saves();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0].hue.ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(saves[0].hue.username, None);
        assert_eq!(saves[1].hue.username.as_deref(), Some("issued-user"));
    }

    #[tokio::test]
    async fn should_only_register_when_address_is_known() {
        let service = PairingService::new(
            FakePairing::with_bridge("10.0.0.2"),
            MemoryStore::default(),
            "custom-app",
        );

        let credentials = service
            .ensure_credentials(record(Some("192.168.1.5"), None))
            .await
            .unwrap();

        assert_eq!(credentials.address, "192.168.1.5");
        assert_eq!(service.pairing.log(), vec!["register 192.168.1.5 custom-app"]);
        assert_eq!(service.store.saves().len(), 1);
    }

    #[tokio::test]
    async fn should_not_pair_when_credentials_are_complete() {
        let service = PairingService::new(
            FakePairing::with_bridge("10.0.0.2"),
            MemoryStore::default(),
            DEFAULT_DEVICE_TYPE,
        );

        let credentials = service
            .ensure_credentials(record(Some("192.168.1.5"), Some("known")))
            .await
            .unwrap();

        assert_eq!(credentials.username, "known");
        assert!(service.pairing.log().is_empty());
        assert!(service.store.saves().is_empty());
    }

    #[tokio::test]
    async fn should_prefer_persisted_credentials_over_configuration() {
        let store = MemoryStore::default();
        store.state.lock().unwrap().apply(&record(Some("10.1.1.1"), Some("stored")));
        let service = PairingService::new(FakePairing::default(), store, DEFAULT_DEVICE_TYPE);

        let credentials = service
            .ensure_credentials(record(Some("192.168.1.5"), None))
            .await
            .unwrap();

        assert_eq!(credentials.address, "10.1.1.1");
        assert_eq!(credentials.username, "stored");
    }

    #[tokio::test]
    async fn should_fail_with_discovery_code() {
        let pairing = FakePairing {
            fail_discovery: true,
            ..FakePairing::default()
        };
        let service = PairingService::new(pairing, MemoryStore::default(), DEFAULT_DEVICE_TYPE);

        let err = service
            .ensure_credentials(CredentialRecord::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PairingError::Discovery(_)));
        assert_eq!(err.exit_code(), 10);
        assert!(service.store.saves().is_empty());
    }

    #[tokio::test]
    async fn should_fail_with_discovery_code_when_nothing_found() {
        let service = PairingService::new(
            FakePairing::default(),
            MemoryStore::default(),
            DEFAULT_DEVICE_TYPE,
        );

        let err = service
            .ensure_credentials(CredentialRecord::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PairingError::NoBridgeFound));
        assert_eq!(err.exit_code(), 10);
    }

    #[tokio::test]
    async fn should_fail_with_registration_code_after_persisting_address() {
        let pairing = FakePairing {
            fail_registration: true,
            ..FakePairing::with_bridge("10.0.0.2")
        };
        let service = PairingService::new(pairing, MemoryStore::default(), DEFAULT_DEVICE_TYPE);

        let err = service
            .ensure_credentials(CredentialRecord::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PairingError::Registration { ref address, .. } if address == "10.0.0.2"));
        assert_eq!(err.exit_code(), 11);
        let saves = service.store.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].hue.ip.as_deref(), Some("10.0.0.2"));
    }
}
