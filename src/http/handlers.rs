use super::state::AppState;
use crate::backend::RegistryError;
use crate::room::messages::CreateRoomResponse;
use crate::room::{CreateRoomRequest, RoomList, RoomLookup, RoomSettings};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Seconds since the epoch, as the client expects in `time` fields
fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /rooms
/// Create a new meeting room
pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> impl IntoResponse {
    info!("Creating room: {} ({})", req.room_id, req.room_type);

    let result = {
        let mut rooms = state.rooms.write().await;
        rooms.create(req)
    };

    match result {
        Ok(room) => (
            StatusCode::OK,
            Json(CreateRoomResponse {
                success: true,
                room,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!("Room not created: {}", e);
            let status = match e {
                RegistryError::Conflict => StatusCode::CONFLICT,
                RegistryError::LimitReached | RegistryError::IdTooLong(_) => StatusCode::FORBIDDEN,
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /rooms/:room_id
/// Look up a single room; unknown ids answer with `room: null`
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    let room = state.rooms.read().await.get(&room_id);

    Json(RoomLookup {
        time: now_secs(),
        room,
    })
}

/// GET /rooms
/// List all live rooms
pub async fn list_rooms(State(state): State<AppState>) -> impl IntoResponse {
    let rooms = state.rooms.read().await.list();

    Json(RoomList {
        time: now_secs(),
        rooms,
    })
}

/// GET /settings
/// Settings applied to rooms created without overrides
pub async fn default_settings() -> impl IntoResponse {
    Json(RoomSettings::default())
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
