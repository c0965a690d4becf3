use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a room session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix of generated participant ids (e.g. "guest" -> "guest-kqzmwpta")
    pub user_id_prefix: String,

    /// Language this participant speaks
    pub spoken_language: String,

    /// Language captions are shown in
    pub caption_language: String,

    /// Room type sent on creation (e.g. "meeting", "lecture")
    pub room_type: String,

    /// How long to wait for a channel acknowledgment
    /// Default: 10 seconds
    pub ack_timeout_ms: u64,

    /// Clean up the session when the backend rejects the join.
    /// Off by default: a rejected join stays attached to the room id.
    pub disconnect_on_join_rejected: bool,
}

impl SessionConfig {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id_prefix: "guest".to_string(),
            spoken_language: "en-US".to_string(),
            caption_language: "en-US".to_string(),
            room_type: "meeting".to_string(),
            ack_timeout_ms: 10_000,
            disconnect_on_join_rejected: false,
        }
    }
}
