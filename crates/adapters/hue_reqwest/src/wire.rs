//! v1 API wire formats.
//!
//! Resource collections are JSON objects keyed by numeric id. Failures come
//! back with HTTP 200 as a list of `{"error": {...}}` entries, and mutations
//! answer with a list mixing `success` and `error` entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use huemqtt_domain::group::{Group, GroupId};
use huemqtt_domain::light::{Light, LightId, LightState};

use crate::error::{HueError, LINK_BUTTON_NOT_PRESSED, UNAUTHORIZED_USER};

#[derive(Debug, Deserialize)]
struct LightResource {
    name: String,
    #[serde(default)]
    state: LightState,
}

#[derive(Debug, Deserialize)]
struct GroupResource {
    name: String,
    #[serde(default)]
    lights: Vec<String>,
    #[serde(default)]
    action: Map<String, Value>,
    #[serde(default)]
    state: Map<String, Value>,
}

/// One `error` entry of a response list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub kind: u32,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

impl From<ApiError> for HueError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            UNAUTHORIZED_USER => Self::Unauthorized {
                description: err.description,
            },
            LINK_BUTTON_NOT_PRESSED => Self::LinkButtonNotPressed,
            kind => Self::Api {
                kind,
                address: err.address,
                description: err.description,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseItem<T> {
    Success { success: T },
    Error { error: ApiError },
}

#[derive(Debug, Deserialize)]
struct Registered {
    username: String,
}

/// Body of `POST /api`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub devicetype: &'a str,
}

/// One entry of the discovery endpoint's answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscoveryEntry {
    pub id: String,
    #[serde(rename = "internalipaddress")]
    pub address: String,
}

/// The first `error` entry of a list body, if the body is one.
fn first_error(body: &Value) -> Option<ApiError> {
    body.as_array()?
        .iter()
        .filter_map(|item| item.get("error"))
        .find_map(|error| ApiError::deserialize(error).ok())
}

fn collection<T: serde::de::DeserializeOwned>(body: Value) -> Result<Vec<(u32, T)>, HueError> {
    if let Some(err) = first_error(&body) {
        return Err(err.into());
    }
    let resources: HashMap<String, T> = serde_json::from_value(body)?;
    let mut parsed = resources
        .into_iter()
        .map(|(key, resource)| match key.parse() {
            Ok(id) => Ok((id, resource)),
            Err(_) => Err(HueError::InvalidId(key)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    parsed.sort_by_key(|(id, _)| *id);
    Ok(parsed)
}

/// Decode a `GET /lights` body, ordered by id.
///
/// # Errors
///
/// Returns the bridge error carried by the body, or [`HueError::Decode`].
pub fn parse_lights(body: Value) -> Result<Vec<Light>, HueError> {
    Ok(collection::<LightResource>(body)?
        .into_iter()
        .map(|(id, resource)| Light {
            id: LightId(id),
            name: resource.name,
            state: resource.state,
        })
        .collect())
}

/// Decode a `GET /groups` body, ordered by id.
///
/// # Errors
///
/// Returns the bridge error carried by the body, or [`HueError::Decode`].
pub fn parse_groups(body: Value) -> Result<Vec<Group>, HueError> {
    Ok(collection::<GroupResource>(body)?
        .into_iter()
        .map(|(id, resource)| Group {
            id: GroupId(id),
            name: resource.name,
            lights: resource.lights,
            action: resource.action,
            state: resource.state,
        })
        .collect())
}

/// Check a `PUT` answer for error entries.
///
/// # Errors
///
/// Returns the first error entry.
pub fn check_mutation(body: &Value) -> Result<(), HueError> {
    match first_error(body) {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Extract the issued username from a `POST /api` answer.
///
/// # Errors
///
/// Returns [`HueError::LinkButtonNotPressed`] when the button was not pressed,
/// another bridge error, or [`HueError::EmptyResponse`].
pub fn parse_registration(body: Value) -> Result<String, HueError> {
    let items: Vec<ResponseItem<Registered>> = serde_json::from_value(body)?;
    match items.into_iter().next() {
        Some(ResponseItem::Success { success }) => Ok(success.username),
        Some(ResponseItem::Error { error }) => Err(error.into()),
        None => Err(HueError::EmptyResponse),
    }
}

/// Decode the discovery endpoint's answer.
///
/// # Errors
///
/// Returns [`HueError::Decode`] for anything but a list of entries.
pub fn parse_discovery(body: Value) -> Result<Vec<DiscoveryEntry>, HueError> {
    Ok(serde_json::from_value(body)?)
}
