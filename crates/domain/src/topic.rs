//! Topic surface of the bridge, relative to a configurable root.
//!
//! | Topic | Direction |
//! |-------|-----------|
//! | `{root}/connected` | publish, retained |
//! | `{root}/set/light/{name}` | subscribe |
//! | `{root}/set/group/{name}` | subscribe |
//! | `{root}/lightsout` | subscribe |
//! | `{root}/lightson` | subscribe |
//! | `{root}/status/light/{name}` | publish, retained |
//! | `{root}/status/group/{name}` | publish, retained |

use crate::error::ValidationError;

/// Topic builder and router bound to one topic root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    root: String,
}

/// An inbound topic recognised by [`Topics::route`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// `{root}/set/light/{name}`
    SetLight(&'a str),
    /// `{root}/set/group/{name}`
    SetGroup(&'a str),
    /// `{root}/lightsout`
    AllOff,
    /// `{root}/lightson`
    AllOn,
}

impl Topics {
    /// Bind to `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTopicRoot`] when the root is empty,
    /// ends with `/`, or contains an MQTT wildcard.
    pub fn new(root: impl Into<String>) -> Result<Self, ValidationError> {
        let root = root.into();
        let reason = if root.is_empty() {
            Some("must not be empty")
        } else if root.ends_with('/') {
            Some("must not end with '/'")
        } else if root.contains(['+', '#']) {
            Some("must not contain wildcards")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ValidationError::InvalidTopicRoot { root, reason }),
            None => Ok(Self { root }),
        }
    }

    /// The configured root.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Retained connectivity status topic.
    #[must_use]
    pub fn connected(&self) -> String {
        format!("{}/connected", self.root)
    }

    /// Retained status topic for a light.
    #[must_use]
    pub fn light_status(&self, name: &str) -> String {
        format!("{}/status/light/{name}", self.root)
    }

    /// Retained status topic for a group.
    #[must_use]
    pub fn group_status(&self, name: &str) -> String {
        format!("{}/status/group/{name}", self.root)
    }

    /// Filters the bridge subscribes to after every broker connect.
    #[must_use]
    pub fn subscriptions(&self) -> [String; 4] {
        [
            format!("{}/set/light/+", self.root),
            format!("{}/set/group/+", self.root),
            format!("{}/lightsout", self.root),
            format!("{}/lightson", self.root),
        ]
    }

    /// Match an inbound topic against the command surface.
    ///
    /// Returns `None` for anything outside it, including empty or nested
    /// entity names.
    #[must_use]
    pub fn route<'a>(&self, topic: &'a str) -> Option<Route<'a>> {
        let rest = topic.strip_prefix(self.root.as_str())?.strip_prefix('/')?;
        match rest {
            "lightsout" => return Some(Route::AllOff),
            "lightson" => return Some(Route::AllOn),
            _ => {}
        }
        if let Some(name) = rest.strip_prefix("set/light/") {
            return entity_name(name).map(Route::SetLight);
        }
        if let Some(name) = rest.strip_prefix("set/group/") {
            return entity_name(name).map(Route::SetGroup);
        }
        None
    }
}

fn entity_name(name: &str) -> Option<&str> {
    (!name.is_empty() && !name.contains('/')).then_some(name)
}
