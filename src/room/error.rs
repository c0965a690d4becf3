//! Room session error types.
//!
//! - `RoomCreation`, `RoomLookup`, `NullRoom`: the room could not be prepared;
//!   the session cleans up after itself before returning these
//! - `JoinRejected`: the backend refused the join request
//! - `DisconnectAck`: the backend did not confirm a disconnect; state is kept
//! - `Transport`, `AckTimeout`: the channel failed or never answered

use super::stage::Stage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Backend refused or never answered the create-room request
    #[error("could not create room {room_id}: {reason}")]
    RoomCreation { room_id: String, reason: String },

    /// Fetching the room after creating it failed
    #[error("could not fetch room {room_id}: {reason}")]
    RoomLookup { room_id: String, reason: String },

    /// Backend answered the lookup but has no such room
    #[error("got null room when joining, room_id: {room_id}")]
    NullRoom { room_id: String },

    #[error("could not join room {room_id}: {message}")]
    JoinRejected { room_id: String, message: String },

    #[error("failed to disconnect user_id: {participant_id} from room_id: {room_id}")]
    DisconnectAck {
        participant_id: String,
        room_id: String,
    },

    #[error("{operation} failed: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    #[error("no acknowledgment for {operation} after {timeout_ms} ms")]
    AckTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("session already active as {participant_id}")]
    AlreadyActive { participant_id: String },
}

impl RoomError {
    /// Message key for the host's translation tables.
    pub fn translation_key(&self) -> &'static str {
        match self {
            RoomError::RoomCreation { .. } => "Room.error_create_room",
            RoomError::RoomLookup { .. } => "Room.error_get_room",
            RoomError::NullRoom { .. } => "Room.error_got_null_room_when_joining",
            RoomError::JoinRejected { .. } => "Room.error_join",
            RoomError::DisconnectAck { .. } => "Room.error_disconnect",
            RoomError::Transport { .. } => "Room.error_transport",
            RoomError::AckTimeout { .. } => "Room.error_ack_timeout",
            RoomError::AlreadyActive { .. } => "Room.error_already_active",
        }
    }

    /// Named interpolation arguments for [`Self::translation_key`].
    pub fn translation_args(&self) -> Vec<(&'static str, String)> {
        match self {
            RoomError::RoomCreation { room_id, reason }
            | RoomError::RoomLookup { room_id, reason } => vec![
                ("roomId", room_id.clone()),
                ("errorMessage", reason.clone()),
            ],
            RoomError::NullRoom { room_id } => vec![("roomId", room_id.clone())],
            RoomError::JoinRejected { room_id, message } => vec![
                ("roomId", room_id.clone()),
                ("errorMessage", message.clone()),
            ],
            RoomError::DisconnectAck {
                participant_id,
                room_id,
            } => vec![
                ("userId", participant_id.clone()),
                ("roomId", room_id.clone()),
            ],
            RoomError::Transport { operation, reason } => vec![
                ("operation", operation.to_string()),
                ("errorMessage", reason.clone()),
            ],
            RoomError::AckTimeout {
                operation,
                timeout_ms,
            } => vec![
                ("operation", operation.to_string()),
                ("timeoutMs", timeout_ms.to_string()),
            ],
            RoomError::AlreadyActive { participant_id } => {
                vec![("userId", participant_id.clone())]
            }
        }
    }
}

/// User-visible notice for a failed `start`, tagged with the stage it failed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub stage: Stage,
    pub error: RoomError,
}

impl std::fmt::Display for ErrorNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Error starting room, current stage: {}, error: {}",
            self.stage, self.error
        )
    }
}
