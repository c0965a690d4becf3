use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Interface toggles a room is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSettings {
    pub max_participants: usize,
    pub captioning_active: bool,
    pub single_caption: bool,
    pub screen_sharing: bool,
}

impl Default for InterfaceSettings {
    fn default() -> Self {
        Self {
            max_participants: 9,
            captioning_active: true,
            single_caption: true,
            screen_sharing: true,
        }
    }
}

/// Settings sent along with a create-room request.
///
/// Only the interface block is interpreted client-side. Anything else the
/// backend understands (speech-translation services, games, ...) is carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    pub interface: InterfaceSettings,
    pub save_audio_logs: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Body of `POST /rooms`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub room_id: String,
    pub room_type: String,
    pub settings: RoomSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub success: bool,
    pub room: RoomDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub spoken_language: Option<String>,
    #[serde(default)]
    pub caption_languages: Vec<String>,
    #[serde(default)]
    pub is_audience: bool,
}

/// Room as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDescriptor {
    pub room_id: String,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub participants: Vec<ParticipantInfo>,
    #[serde(default)]
    pub settings: RoomSettings,
}

/// Response of `GET /rooms/:room_id`; `room` is null for unknown ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomLookup {
    #[serde(default)]
    pub time: f64,
    pub room: Option<RoomDescriptor>,
}

/// Response of `GET /rooms`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomList {
    #[serde(default)]
    pub time: f64,
    pub rooms: Vec<RoomDescriptor>,
}

/// Payload of the `/join` channel event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub spoken_language: String,
    pub caption_languages: Vec<String>,
    pub name: String,
    pub user_id: String,
    pub room_id: String,
}

/// Acknowledgment of a join request.
///
/// On success the backend also replays the caption history and reactions the
/// participant missed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinAck {
    pub could_join: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub history: Vec<Value>,
    #[serde(default)]
    pub reactions: Vec<Value>,
}

impl JoinAck {
    pub fn accepted() -> Self {
        Self {
            could_join: true,
            ..Self::default()
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            could_join: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Decode an ack sent either as an object or as the positional
    /// `[couldJoin, errorMessage, history, reactions]` array.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(payload).context("Join ack is not JSON")?;

        match value {
            Value::Array(items) => {
                let mut items = items.into_iter();
                let could_join = items
                    .next()
                    .and_then(|v| v.as_bool())
                    .context("Join ack is missing couldJoin")?;
                let error_message = items
                    .next()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .filter(|s| !s.is_empty());
                let history = list_or_empty(items.next());
                let reactions = list_or_empty(items.next());

                Ok(Self {
                    could_join,
                    error_message,
                    history,
                    reactions,
                })
            }
            other => {
                let mut ack: Self =
                    serde_json::from_value(other).context("Malformed join ack")?;
                ack.error_message = ack.error_message.filter(|s| !s.is_empty());
                Ok(ack)
            }
        }
    }
}

fn list_or_empty(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Payload of the `disconnect-user` channel event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    pub user_id: String,
}

/// Anything other than a literal `true` counts as "not acknowledged".
pub fn decode_disconnect_ack(payload: &[u8]) -> bool {
    serde_json::from_slice::<bool>(payload).unwrap_or(false)
}
