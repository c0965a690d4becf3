use crate::backend::{RoomLimits, RoomRegistry};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared application state for HTTP handlers and channel responders
#[derive(Clone)]
pub struct AppState {
    /// Live rooms (room_id → room)
    pub rooms: Arc<RwLock<RoomRegistry>>,
}

impl AppState {
    pub fn new(limits: RoomLimits) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(RoomRegistry::new(limits))),
        }
    }

    /// Drop expired rooms every `period`. Runs until the task is aborted.
    pub async fn expire_rooms(self, period: Duration) {
        let mut ticker = tokio::time::interval(period);

        loop {
            ticker.tick().await;

            let expired = self.rooms.write().await.expire(Utc::now());
            if !expired.is_empty() {
                debug!("Expired {} room(s)", expired.len());
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RoomLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{CreateRoomRequest, RoomSettings};

    #[tokio::test]
    async fn test_sweep_removes_unused_rooms() {
        let state = AppState::new(RoomLimits {
            unused_room_ttl_secs: 0,
            ..RoomLimits::default()
        });
        state
            .rooms
            .write()
            .await
            .create(CreateRoomRequest {
                room_id: "idle".to_string(),
                room_type: "meeting".to_string(),
                settings: RoomSettings::default(),
            })
            .unwrap();

        let sweep = tokio::spawn(state.clone().expire_rooms(Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweep.abort();

        assert!(state.rooms.read().await.is_empty());
    }
}
