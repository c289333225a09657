//! Device-bridge credentials and the persisted local state file.
//!
//! The local state file is a JSON object of the form
//! `{"hue": {"ip": "…", "username": "…"}}`. Keys this crate does not know
//! about are carried through untouched so that rewriting the file after
//! discovery or pairing never drops them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fully authorised device-bridge address and application username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub address: String,
    pub username: String,
}

/// Possibly incomplete pairing information.
///
/// Once both fields are present pairing is not attempted again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    pub address: Option<String>,
    pub username: Option<String>,
}

impl CredentialRecord {
    /// Fill fields missing from `self` with those of `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            address: self.address.or(fallback.address),
            username: self.username.or(fallback.username),
        }
    }

    /// The credentials, when both fields are present.
    #[must_use]
    pub fn complete(&self) -> Option<Credentials> {
        Some(Credentials {
            address: self.address.clone()?,
            username: self.username.clone()?,
        })
    }
}

/// Contents of the persisted local state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub hue: HueLocalState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `hue` section of the local state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HueLocalState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocalState {
    /// The pairing information stored in this file.
    #[must_use]
    pub fn record(&self) -> CredentialRecord {
        CredentialRecord {
            address: self.hue.ip.clone(),
            username: self.hue.username.clone(),
        }
    }

    /// Store `record`, keeping every other key as it was.
    pub fn apply(&mut self, record: &CredentialRecord) {
        if let Some(address) = &record.address {
            self.hue.ip = Some(address.clone());
        }
        if let Some(username) = &record.username {
            self.hue.username = Some(username.clone());
        }
    }
}
