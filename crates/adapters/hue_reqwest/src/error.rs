//! Hue adapter error types.

use huemqtt_domain::error::HueMqttError;

/// Bridge error type for an unauthorised username.
pub const UNAUTHORIZED_USER: u32 = 1;
/// Bridge error type for a registration attempted without the link button.
pub const LINK_BUTTON_NOT_PRESSED: u32 = 101;

/// Errors originating from the bridge or the discovery endpoint.
#[derive(Debug, thiserror::Error)]
pub enum HueError {
    /// The request could not be sent, timed out, or returned a non-success
    /// status or an undecodable body.
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// A response body did not have the expected shape.
    #[error("unexpected response body")]
    Decode(#[from] serde_json::Error),

    /// The configured username is not authorised on the bridge.
    #[error("unauthorized user: {description}")]
    Unauthorized { description: String },

    /// Registration was attempted without pressing the link button.
    #[error("link button not pressed, press the button on the bridge and start again")]
    LinkButtonNotPressed,

    /// Any other error entry returned by the bridge.
    #[error("bridge error {kind} at {address:?}: {description}")]
    Api {
        kind: u32,
        address: String,
        description: String,
    },

    /// The bridge answered with an empty result list.
    #[error("empty response from bridge")]
    EmptyResponse,

    /// A resource key that is not a numeric identifier.
    #[error("invalid resource identifier {0:?}")]
    InvalidId(String),
}

impl From<HueError> for HueMqttError {
    fn from(err: HueError) -> Self {
        Self::Device(Box::new(err))
    }
}
