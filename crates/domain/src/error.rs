//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HueMqttError`] at port boundaries. Adapter failures are carried as boxed
//! sources under the variant naming the external system they came from.

use std::error::Error as StdError;

/// Boxed error source coming from an adapter.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum HueMqttError {
    /// Input failed a domain invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The device bridge (HTTP API or discovery) failed.
    #[error("device bridge error")]
    Device(#[source] BoxError),

    /// The message bus failed.
    #[error("message bus error")]
    Bus(#[source] BoxError),

    /// Local persistence failed.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

/// Invariant violations detected by domain parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A numeric brightness payload outside `0..=255`.
    #[error("{0} is not a valid brightness")]
    BrightnessOutOfRange(f64),

    /// A numeric payload with a fractional part.
    #[error("{0} is not an integer brightness")]
    FractionalBrightness(f64),

    /// A structured payload that is not a JSON object of light options.
    #[error("invalid light command payload: {0}")]
    InvalidPayload(String),

    /// A payload that is not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    NotUtf8,

    /// The configured topic root is unusable.
    #[error("invalid topic root {root:?}: {reason}")]
    InvalidTopicRoot {
        /// The rejected root.
        root: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// A lookup that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {name:?} does not exist")]
pub struct NotFoundError {
    /// Kind of entity looked up (`"light"`, `"group"`).
    pub entity: &'static str,
    /// The normalised name that was requested.
    pub name: String,
}
