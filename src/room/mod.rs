//! Room session management
//!
//! This module provides the `RoomSession` state machine that manages:
//! - Room creation and lookup on the REST backend
//! - Presence announcement and the join handshake over the channel
//! - Disconnect, including page-lifecycle triggered teardown
//! - Stage tracking for diagnostics

mod config;
mod error;
pub mod messages;
mod ports;
mod session;
mod stage;

pub use config::SessionConfig;
pub use error::{ErrorNotice, RoomError};
pub use messages::{
    CreateRoomRequest, DisconnectRequest, InterfaceSettings, JoinAck, JoinRequest,
    ParticipantInfo, RoomDescriptor, RoomList, RoomLookup, RoomSettings,
};
pub use ports::{Channel, LoggingHooks, RoomBackend, SessionHooks};
pub use session::RoomSession;
pub use stage::{PageEvent, Stage};
