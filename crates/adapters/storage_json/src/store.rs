//! [`CredentialStore`] backed by a JSON file on disk.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use huemqtt_app::ports::CredentialStore;
use huemqtt_domain::credentials::LocalState;
use huemqtt_domain::error::HueMqttError;

use crate::error::JsonStoreError;

/// The local state file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store reading and writing `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<LocalState, JsonStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no local state file yet");
                return Ok(LocalState::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => Ok(state),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable local state file");
                Ok(LocalState::default())
            }
        }
    }

    async fn write(&self, state: &LocalState) -> Result<(), JsonStoreError> {
        let mut bytes = serde_json::to_vec_pretty(state)?;
        bytes.push(b'\n');
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        tracing::debug!(path = %self.path.display(), "local state saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> JsonStoreError {
        JsonStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self) -> impl Future<Output = Result<LocalState, HueMqttError>> + Send {
        async move { self.read().await.map_err(HueMqttError::from) }
    }

    fn save(&self, state: &LocalState) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        async move { self.write(state).await.map_err(HueMqttError::from) }
    }
}
