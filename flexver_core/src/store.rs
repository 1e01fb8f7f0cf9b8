/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::store
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Fold version actions into the canonical VersionInfo
    snapshot and hold that snapshot for the session.

  Security / Safety Notes:
    Pure state transitions; decoding never evaluates payload
    content beyond string conversion.

  Dependencies:
    serde/serde_json for the action wire form.

  Operational Scope:
    Written only by the composition root (single writer), read
    by the version view.

  Revision History:
    2025-11-12 COD  Authored version reducer and store.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Total functions with no hidden failure paths
    - Wholesale replacement over field merging
============================================================*/

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{FlexverError, Result};
use crate::logger::Logger;
use crate::version_info::VersionInfo;

/// Action tag carrying freshly fetched version metadata.
pub const GET_VERSION: &str = "GET_VERSION";

/// Payload of a [`GET_VERSION`] action as emitted by the daemon API.
///
/// Missing or null fields decode to empty strings; non-string scalars keep
/// their textual form. Unknown fields are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VersionPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub api_version: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub flexget_version: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub latest_version: String,
}

/// Tagged message describing an intended state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Untyped initialisation action (`{}`).
    Init,
    /// [`GET_VERSION`]: replace the snapshot.
    VersionReceived(VersionPayload),
    /// Any other tag; ignored by the version reducer.
    Other(String),
}

#[derive(Deserialize)]
struct RawAction {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    payload: Option<Value>,
}

impl Action {
    /// Decode an action from its JSON wire form `{type, payload?}`.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawAction = serde_json::from_str(text).map_err(|err| {
            FlexverError::Serialization(format!("Failed to decode action: {err}"))
        })?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawAction) -> Self {
        let kind = match raw.kind {
            None | Some(Value::Null) => return Action::Init,
            Some(Value::String(kind)) => kind,
            Some(other) => return Action::Other(other.to_string()),
        };
        if kind != GET_VERSION {
            return Action::Other(kind);
        }
        let payload = match raw.payload {
            Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            _ => VersionPayload::default(),
        };
        Action::VersionReceived(payload)
    }

    /// Tag of this action; empty for the initialisation action.
    pub fn kind(&self) -> &str {
        match self {
            Action::Init => "",
            Action::VersionReceived(_) => GET_VERSION,
            Action::Other(kind) => kind,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

/// Fold `action` into `state`, substituting the default snapshot for `None`.
pub fn reduce(state: Option<VersionInfo>, action: &Action) -> VersionInfo {
    let state = state.unwrap_or_default();
    match action {
        Action::VersionReceived(payload) => VersionInfo::new(
            payload.api_version.as_str(),
            payload.flexget_version.as_str(),
            payload.latest_version.as_str(),
        ),
        Action::Init | Action::Other(_) => state,
    }
}

/// Owner of the session's version snapshot.
#[derive(Debug, Default)]
pub struct VersionStore {
    state: VersionInfo,
}

impl VersionStore {
    /// Build a store seeded by the initialisation action.
    pub fn new() -> Self {
        Self {
            state: reduce(None, &Action::Init),
        }
    }

    pub fn state(&self) -> &VersionInfo {
        &self.state
    }

    pub fn dispatch(&mut self, action: &Action, logger: &Logger) {
        logger.debug("DISPATCH", format!("action type=`{}`", action.kind()));
        let previous = std::mem::take(&mut self.state);
        self.state = reduce(Some(previous), action);
    }
}
