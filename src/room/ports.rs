//! Port traits the room session depends on.
//!
//! The session never talks to reqwest or NATS directly; adapters in
//! [`crate::http`] and [`crate::nats`] implement these.

use super::error::ErrorNotice;
use super::messages::{
    CreateRoomRequest, DisconnectRequest, JoinAck, JoinRequest, RoomDescriptor, RoomList,
    RoomLookup, RoomSettings,
};
use super::stage::Stage;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info};

// ---------------------------------------------------------------------------
// Resource client (REST backend)
// ---------------------------------------------------------------------------

/// Room resources on the backend.
///
/// Network failures and non-success statuses are `Err`. An unknown room is
/// `Ok` with `room: None`.
#[async_trait]
pub trait RoomBackend: Send + Sync {
    async fn create_room(&self, request: &CreateRoomRequest) -> Result<RoomDescriptor>;

    async fn get_room(&self, room_id: &str) -> Result<RoomLookup>;

    async fn list_rooms(&self) -> Result<RoomList>;

    /// Settings the backend would apply to a room created without overrides.
    async fn default_settings(&self) -> Result<RoomSettings>;
}

// ---------------------------------------------------------------------------
// Channel transport
// ---------------------------------------------------------------------------

/// Persistent bidirectional channel to the backend.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Announce which page/topic this client is on. Not acknowledged.
    async fn notify_page(&self, page: &str) -> Result<()>;

    /// Send a join request and wait for the backend's answer.
    async fn join(&self, request: &JoinRequest) -> Result<JoinAck>;

    /// Ask the backend to drop a participant. `Ok(false)` means the backend
    /// answered but did not confirm.
    async fn disconnect_user(&self, request: &DisconnectRequest) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// Host hooks
// ---------------------------------------------------------------------------

/// Callbacks into whatever hosts the session (UI, CLI, tests).
pub trait SessionHooks: Send + Sync {
    fn on_stage(&self, _stage: Stage) {}

    /// Runs once the backend has accepted the join.
    fn on_joined(&self, _room: &RoomDescriptor) {}

    /// A `start` failed before joining; show it to the user.
    fn on_error(&self, _notice: &ErrorNotice) {}
}

/// Hooks that only log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHooks;

impl SessionHooks for LoggingHooks {
    fn on_joined(&self, room: &RoomDescriptor) {
        info!(
            "Joined room {} ({} participants)",
            room.room_id,
            room.participants.len()
        );
    }

    fn on_error(&self, notice: &ErrorNotice) {
        error!("{}", notice);
    }
}
