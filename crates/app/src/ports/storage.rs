//! Storage port — the persisted local state holding bridge credentials.

use std::future::Future;

use huemqtt_domain::credentials::LocalState;
use huemqtt_domain::error::HueMqttError;

/// Reads and rewrites the local state file.
pub trait CredentialStore {
    /// Load the current state; a missing store yields [`LocalState::default`].
    fn load(&self) -> impl Future<Output = Result<LocalState, HueMqttError>> + Send;

    /// Replace the stored state with `state`.
    fn save(&self, state: &LocalState) -> impl Future<Output = Result<(), HueMqttError>> + Send;
}

impl<T: CredentialStore + Send + Sync> CredentialStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<LocalState, HueMqttError>> + Send {
        (**self).load()
    }

    fn save(&self, state: &LocalState) -> impl Future<Output = Result<(), HueMqttError>> + Send {
        (**self).save(state)
    }
}
