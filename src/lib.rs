pub mod backend;
pub mod catalog;
pub mod config;
pub mod http;
pub mod ids;
pub mod nats;
pub mod room;
pub mod speaker;

pub use catalog::Catalog;
pub use config::Config;
pub use http::{create_router, AppState, HttpRoomClient};
pub use nats::{NatsChannel, TranscriptMessage};
pub use room::{
    Channel, PageEvent, RoomBackend, RoomError, RoomSession, RoomSettings, SessionConfig,
    SessionHooks, Stage,
};
pub use speaker::{SpeakerArbiter, SpeakerError};
