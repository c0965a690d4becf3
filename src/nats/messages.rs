use serde::{Deserialize, Serialize};

/// Fire-and-forget presence announcement
pub const ON_PAGE: &str = "on-page";
/// Join request, answered with a [`crate::room::JoinAck`]
pub const JOIN: &str = "join";
/// Disconnect request, answered with a JSON boolean
pub const DISCONNECT_USER: &str = "disconnect-user";

/// Channel subject for `event` under `prefix` (e.g. "babel.join").
pub fn subject(prefix: &str, event: &str) -> String {
    format!("{prefix}.{event}")
}

/// Subject transcripts for `room_id` are published on.
pub fn transcript_subject(prefix: &str, room_id: &str) -> String {
    format!("{prefix}.transcript.{room_id}")
}

/// Transcript message received from the speech-translation service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    pub room_id: String,
    /// Participant the utterance came from
    pub speaker_id: String,
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub partial: bool,
    pub timestamp: String, // RFC3339 timestamp
    #[serde(default)]
    pub confidence: Option<f32>,
}
