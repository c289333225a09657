//! Inbound commands and light-command payload parsing.
//!
//! A light command payload is either a bare number (a brightness) or a JSON
//! object of light options:
//!
//! | Payload | Update |
//! |---------|--------|
//! | `0` | `{on: false}` |
//! | `1`..=`255` | `{on: true, bri: n}` |
//! | any other number | rejected |
//! | `{"on": …, "bri": …, "alert": …, "effect": …, "transitiontime": …}` | forwarded as-is |

use crate::error::ValidationError;
use crate::light::LightStateUpdate;
use crate::topic::{Route, Topics};

/// A message from the bus that matched the command surface.
///
/// Payloads are kept raw: the entity is resolved before the payload is
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetLight { name: String, payload: Vec<u8> },
    SetGroup { name: String, payload: Vec<u8> },
    /// Switch every light off (group 0).
    AllOff,
    /// Switch every light on (group 0).
    AllOn,
}

impl Command {
    /// Recognise a bus message; `None` when the topic is not a command topic.
    #[must_use]
    pub fn from_message(topics: &Topics, topic: &str, payload: &[u8]) -> Option<Self> {
        let command = match topics.route(topic)? {
            Route::SetLight(name) => Self::SetLight {
                name: name.to_string(),
                payload: payload.to_vec(),
            },
            Route::SetGroup(name) => Self::SetGroup {
                name: name.to_string(),
                payload: payload.to_vec(),
            },
            Route::AllOff => Self::AllOff,
            Route::AllOn => Self::AllOn,
        };
        Some(command)
    }
}

/// Interpret a light command payload.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the payload is not UTF-8, is a number
/// that is not an integer brightness in `0..=255`, or is neither a number nor
/// a JSON object of light options.
pub fn parse_light_payload(payload: &[u8]) -> Result<LightStateUpdate, ValidationError> {
    let text = std::str::from_utf8(payload).map_err(|_| ValidationError::NotUtf8)?;
    match text.trim().parse::<f64>() {
        Ok(value) if !value.is_nan() => brightness_update(value),
        _ => serde_json::from_str::<LightStateUpdate>(text)
            .map_err(|err| ValidationError::InvalidPayload(err.to_string())),
    }
}

/// Map a numeric brightness onto a light update.
///
/// # Errors
///
/// Returns [`ValidationError::FractionalBrightness`] for non-integers and
/// [`ValidationError::BrightnessOutOfRange`] outside `0..=255`.
pub fn brightness_update(value: f64) -> Result<LightStateUpdate, ValidationError> {
    if !(0.0..=255.0).contains(&value) {
        return Err(ValidationError::BrightnessOutOfRange(value));
    }
    if value.fract() != 0.0 {
        return Err(ValidationError::FractionalBrightness(value));
    }
    // Range and integrality are checked above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let brightness = value as u8;
    if brightness == 0 {
        Ok(LightStateUpdate::off())
    } else {
        Ok(LightStateUpdate::on_at(brightness))
    }
}
