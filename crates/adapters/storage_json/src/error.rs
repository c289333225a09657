//! State-file error type.

use std::path::PathBuf;

use huemqtt_domain::error::HueMqttError;

/// Errors originating from the JSON state file.
#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    /// Reading, creating or writing the file failed.
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state could not be serialised.
    #[error("failed to encode local state")]
    Encode(#[from] serde_json::Error),
}

impl From<JsonStoreError> for HueMqttError {
    fn from(err: JsonStoreError) -> Self {
        Self::Storage(Box::new(err))
    }
}
