//! HTTP side of the room backend
//!
//! Client: [`HttpRoomClient`] implements [`crate::room::RoomBackend`] with reqwest.
//!
//! Server (development backend):
//! - GET /rooms - List live rooms
//! - POST /rooms - Create a room
//! - GET /rooms/:id - Look up one room (`room` is null when unknown)
//! - GET /settings - Default room settings
//! - GET /health - Health check

mod client;
mod handlers;
mod routes;
mod state;

pub use client::HttpRoomClient;
pub use routes::create_router;
pub use state::AppState;
