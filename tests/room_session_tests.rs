// Integration tests for the room session lifecycle
//
// The backend and channel are in-memory fakes that record every call, so
// these tests can check what was (and was not) sent at each stage.

use anyhow::Result;
use async_trait::async_trait;
use babel_meetings::room::{
    Channel, CreateRoomRequest, DisconnectRequest, ErrorNotice, JoinAck, JoinRequest, PageEvent,
    RoomBackend, RoomDescriptor, RoomError, RoomList, RoomLookup, RoomSession, RoomSettings,
    SessionConfig, SessionHooks, Stage,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Lookup {
    Found,
    Null,
}

struct FakeBackend {
    fail_create: bool,
    lookup: Lookup,
    created: Mutex<Vec<CreateRoomRequest>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            fail_create: false,
            lookup: Lookup::Found,
            created: Mutex::new(Vec::new()),
        }
    }

    fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::new()
        }
    }

    fn null_room() -> Self {
        Self {
            lookup: Lookup::Null,
            ..Self::new()
        }
    }
}

fn room(room_id: &str) -> RoomDescriptor {
    RoomDescriptor {
        room_id: room_id.to_string(),
        room_type: Some("meeting".to_string()),
        participants: Vec::new(),
        settings: RoomSettings::default(),
    }
}

#[async_trait]
impl RoomBackend for FakeBackend {
    async fn create_room(&self, request: &CreateRoomRequest) -> Result<RoomDescriptor> {
        self.created.lock().unwrap().push(request.clone());
        if self.fail_create {
            anyhow::bail!("Backend answered 409 Conflict");
        }
        Ok(room(&request.room_id))
    }

    async fn get_room(&self, room_id: &str) -> Result<RoomLookup> {
        let room = match self.lookup {
            Lookup::Found => Some(room(room_id)),
            Lookup::Null => None,
        };
        Ok(RoomLookup { time: 0.0, room })
    }

    async fn list_rooms(&self) -> Result<RoomList> {
        Ok(RoomList {
            time: 0.0,
            rooms: Vec::new(),
        })
    }

    async fn default_settings(&self) -> Result<RoomSettings> {
        Ok(RoomSettings::default())
    }
}

#[derive(Default)]
struct FakeChannel {
    pages: Mutex<Vec<String>>,
    joins: Mutex<Vec<JoinRequest>>,
    disconnects: Mutex<Vec<DisconnectRequest>>,
    join_acks: Mutex<VecDeque<JoinAck>>,
    disconnect_acks: Mutex<VecDeque<bool>>,
    hang_on_join: bool,
}

impl FakeChannel {
    fn with_join_ack(ack: JoinAck) -> Self {
        let channel = Self::default();
        channel.join_acks.lock().unwrap().push_back(ack);
        channel
    }

    fn queue_disconnect_ack(&self, ok: bool) {
        self.disconnect_acks.lock().unwrap().push_back(ok);
    }

    fn join_count(&self) -> usize {
        self.joins.lock().unwrap().len()
    }

    fn disconnect_count(&self) -> usize {
        self.disconnects.lock().unwrap().len()
    }
}

#[async_trait]
impl Channel for FakeChannel {
    async fn notify_page(&self, page: &str) -> Result<()> {
        self.pages.lock().unwrap().push(page.to_string());
        Ok(())
    }

    async fn join(&self, request: &JoinRequest) -> Result<JoinAck> {
        self.joins.lock().unwrap().push(request.clone());
        if self.hang_on_join {
            std::future::pending::<()>().await;
        }
        let ack = self.join_acks.lock().unwrap().pop_front();
        Ok(ack.unwrap_or_else(JoinAck::accepted))
    }

    async fn disconnect_user(&self, request: &DisconnectRequest) -> Result<bool> {
        self.disconnects.lock().unwrap().push(request.clone());
        // Backend acknowledges unless a test queued something else.
        let ack = self.disconnect_acks.lock().unwrap().pop_front();
        Ok(ack.unwrap_or(true))
    }
}

#[derive(Default)]
struct RecordingHooks {
    stages: Mutex<Vec<Stage>>,
    notices: Mutex<Vec<ErrorNotice>>,
    joined: Mutex<Vec<String>>,
}

impl SessionHooks for RecordingHooks {
    fn on_stage(&self, stage: Stage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_joined(&self, room: &RoomDescriptor) {
        self.joined.lock().unwrap().push(room.room_id.clone());
    }

    fn on_error(&self, notice: &ErrorNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

fn session_with(
    config: SessionConfig,
    backend: FakeBackend,
    channel: FakeChannel,
) -> (RoomSession, Arc<FakeBackend>, Arc<FakeChannel>, Arc<RecordingHooks>) {
    let backend = Arc::new(backend);
    let channel = Arc::new(channel);
    let hooks = Arc::new(RecordingHooks::default());
    let session = RoomSession::new(config, backend.clone(), channel.clone()).with_hooks(hooks.clone());
    (session, backend, channel, hooks)
}

fn session(
    backend: FakeBackend,
    channel: FakeChannel,
) -> (RoomSession, Arc<FakeBackend>, Arc<FakeChannel>, Arc<RecordingHooks>) {
    session_with(SessionConfig::default(), backend, channel)
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_start_walks_every_stage() -> Result<()> {
    let (mut session, backend, channel, hooks) = session(FakeBackend::new(), FakeChannel::default());

    session.start(RoomSettings::default(), "abc-defg-hij").await?;

    assert!(session.is_joined());
    assert_eq!(session.stage().label(), "5: joined room");
    assert_eq!(
        *hooks.stages.lock().unwrap(),
        vec![
            Stage::CreatingRoom,
            Stage::Subscribing,
            Stage::FetchingRoom,
            Stage::Joining,
            Stage::Joined
        ]
    );
    assert_eq!(*hooks.joined.lock().unwrap(), vec!["abc-defg-hij".to_string()]);
    assert_eq!(session.room().map(|r| r.room_id.as_str()), Some("abc-defg-hij"));

    let created = backend.created.lock().unwrap();
    assert_eq!(created[0].room_id, "abc-defg-hij");
    assert_eq!(created[0].room_type, "meeting");

    assert_eq!(*channel.pages.lock().unwrap(), vec!["room/abc-defg-hij".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_join_request_carries_preferences() -> Result<()> {
    let config = SessionConfig {
        user_id_prefix: "host".to_string(),
        spoken_language: "es-ES".to_string(),
        caption_language: "zh".to_string(),
        ..SessionConfig::default()
    };
    let (mut session, _, channel, _) = session_with(config, FakeBackend::new(), FakeChannel::default());

    session.start(RoomSettings::default(), "room").await?;

    let participant_id = session.participant_id().unwrap().to_string();
    assert!(participant_id.starts_with("host-"));
    assert_eq!(participant_id.len(), "host-".len() + 8);

    let joins = channel.joins.lock().unwrap();
    assert_eq!(
        joins[0],
        JoinRequest {
            spoken_language: "es-ES".to_string(),
            caption_languages: vec!["zh".to_string()],
            name: participant_id.clone(),
            user_id: participant_id,
            room_id: "room".to_string(),
        }
    );

    Ok(())
}

// ============================================================================
// Failures before joining
// ============================================================================

#[tokio::test]
async fn test_create_failure_cleans_up() -> Result<()> {
    let (mut session, _, channel, hooks) = session(FakeBackend::failing_create(), FakeChannel::default());

    let err = session.start(RoomSettings::default(), "room").await.unwrap_err();

    assert!(matches!(err, RoomError::RoomCreation { .. }));

    {
        let notices = hooks.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].stage.label(), "1: create room in backend");
        assert!(notices[0]
            .to_string()
            .starts_with("Error starting room, current stage: 1: create room in backend"));
    }

    // Nothing was announced or joined.
    assert!(channel.pages.lock().unwrap().is_empty());
    assert_eq!(channel.join_count(), 0);

    // Cleanup already ran, so a later disconnect has nothing to send.
    assert_eq!(session.participant_id(), None);
    assert_eq!(session.stage(), Stage::Idle);
    let sent = channel.disconnect_count();
    session.disconnect().await?;
    assert_eq!(channel.disconnect_count(), sent);

    Ok(())
}

#[tokio::test]
async fn test_cleanup_drops_state_even_without_ack() -> Result<()> {
    let channel = FakeChannel::default();
    channel.queue_disconnect_ack(false);
    let (mut session, _, channel, _) = session(FakeBackend::failing_create(), channel);

    assert!(session.start(RoomSettings::default(), "room").await.is_err());

    assert_eq!(channel.disconnect_count(), 1);
    assert_eq!(session.participant_id(), None);
    assert_eq!(session.stage(), Stage::Idle);

    Ok(())
}

#[tokio::test]
async fn test_null_room_never_joins() -> Result<()> {
    let (mut session, _, channel, hooks) = session(FakeBackend::null_room(), FakeChannel::default());

    let err = session.start(RoomSettings::default(), "ghost").await.unwrap_err();

    assert_eq!(
        err,
        RoomError::NullRoom {
            room_id: "ghost".to_string()
        }
    );
    assert_eq!(err.translation_key(), "Room.error_got_null_room_when_joining");
    assert!(!hooks.stages.lock().unwrap().contains(&Stage::Joined));
    assert_eq!(hooks.notices.lock().unwrap()[0].stage, Stage::FetchingRoom);
    assert_eq!(channel.join_count(), 0);
    assert_eq!(channel.disconnect_count(), 1);
    assert!(!session.is_joined());
    assert_eq!(session.participant_id(), None);

    Ok(())
}

#[tokio::test]
async fn test_join_ack_timeout_is_reported() -> Result<()> {
    let config = SessionConfig {
        ack_timeout_ms: 20,
        ..SessionConfig::default()
    };
    let channel = FakeChannel {
        hang_on_join: true,
        ..FakeChannel::default()
    };
    let (mut session, _, channel, hooks) = session_with(config, FakeBackend::new(), channel);

    let err = session.start(RoomSettings::default(), "room").await.unwrap_err();

    assert_eq!(
        err,
        RoomError::AckTimeout {
            operation: "/join",
            timeout_ms: 20
        }
    );
    assert_eq!(hooks.notices.lock().unwrap()[0].stage, Stage::Joining);
    assert_eq!(channel.disconnect_count(), 1);
    assert_eq!(session.stage(), Stage::Idle);

    Ok(())
}

// ============================================================================
// Join rejection
// ============================================================================

#[tokio::test]
async fn test_join_rejection_stays_attached() -> Result<()> {
    let (mut session, _, channel, hooks) = session(
        FakeBackend::new(),
        FakeChannel::with_join_ack(JoinAck::rejected("room is full.")),
    );

    let err = session.start(RoomSettings::default(), "room").await.unwrap_err();

    assert_eq!(
        err,
        RoomError::JoinRejected {
            room_id: "room".to_string(),
            message: "room is full.".to_string()
        }
    );
    assert_eq!(err.translation_key(), "Room.error_join");
    assert!(err
        .translation_args()
        .contains(&("errorMessage", "room is full.".to_string())));

    // Raised to the caller, not shown as a start notice, and no cleanup.
    assert!(hooks.notices.lock().unwrap().is_empty());
    assert!(hooks.joined.lock().unwrap().is_empty());
    assert_eq!(channel.disconnect_count(), 0);
    assert_eq!(session.stage(), Stage::Joining);
    assert_eq!(session.room_id(), Some("room"));
    assert!(session.participant_id().is_some());

    // The caller can still tear it down.
    session.try_disconnect().await?;
    assert_eq!(session.stage(), Stage::Idle);

    Ok(())
}

#[tokio::test]
async fn test_join_rejection_cleanup_when_configured() -> Result<()> {
    let config = SessionConfig {
        disconnect_on_join_rejected: true,
        ..SessionConfig::default()
    };
    let (mut session, _, channel, _) = session_with(
        config,
        FakeBackend::new(),
        FakeChannel::with_join_ack(JoinAck::rejected("name cannot be empty.")),
    );

    assert!(session.start(RoomSettings::default(), "room").await.is_err());
    assert_eq!(channel.disconnect_count(), 1);
    assert_eq!(session.participant_id(), None);

    Ok(())
}

#[tokio::test]
async fn test_start_while_active_is_refused() -> Result<()> {
    let (mut session, backend, _, _) = session(FakeBackend::new(), FakeChannel::default());
    session.start(RoomSettings::default(), "room").await?;

    let err = session.start(RoomSettings::default(), "other").await.unwrap_err();

    assert!(matches!(err, RoomError::AlreadyActive { .. }));
    assert_eq!(backend.created.lock().unwrap().len(), 1);
    assert_eq!(session.room_id(), Some("room"));

    Ok(())
}

// ============================================================================
// Disconnect
// ============================================================================

#[tokio::test]
async fn test_disconnect_twice_sends_once() -> Result<()> {
    let (mut session, _, channel, _) = session(FakeBackend::new(), FakeChannel::default());
    session.start(RoomSettings::default(), "room").await?;
    let participant_id = session.participant_id().unwrap().to_string();

    session.disconnect().await?;
    assert_eq!(session.stage(), Stage::Idle);
    assert_eq!(session.participant_id(), None);
    assert!(session.room().is_none());

    session.disconnect().await?;

    let disconnects = channel.disconnects.lock().unwrap();
    assert_eq!(disconnects.len(), 1);
    assert_eq!(disconnects[0].user_id, participant_id);

    Ok(())
}

#[tokio::test]
async fn test_unacknowledged_disconnect_keeps_state() -> Result<()> {
    let (mut session, _, channel, _) = session(FakeBackend::new(), FakeChannel::default());
    session.start(RoomSettings::default(), "room").await?;
    let participant_id = session.participant_id().unwrap().to_string();

    channel.queue_disconnect_ack(false);
    let err = session.try_disconnect().await.unwrap_err();

    assert_eq!(
        err,
        RoomError::DisconnectAck {
            participant_id: participant_id.clone(),
            room_id: "room".to_string()
        }
    );
    assert!(session.is_joined());
    assert_eq!(session.participant_id(), Some(participant_id.as_str()));

    // Retry succeeds once the backend confirms.
    session.try_disconnect().await?;
    assert_eq!(session.stage(), Stage::Idle);
    assert_eq!(channel.disconnect_count(), 2);

    Ok(())
}

#[tokio::test]
async fn test_fatal_disconnect_surfaces_error() -> Result<()> {
    let (mut session, _, channel, _) = session(FakeBackend::new(), FakeChannel::default());
    session.start(RoomSettings::default(), "room").await?;

    channel.queue_disconnect_ack(false);
    let err = session.disconnect().await.unwrap_err();

    assert!(err.downcast_ref::<RoomError>().is_some());
    assert!(session.participant_id().is_some());

    Ok(())
}

#[tokio::test]
async fn test_page_events_disconnect_only_after_join() -> Result<()> {
    let (mut session, _, channel, _) = session(FakeBackend::new(), FakeChannel::default());

    assert!(!session.handle_page_event(PageEvent::PopState).await?);

    session.start(RoomSettings::default(), "room").await?;
    assert!(session.handle_page_event(PageEvent::PopState).await?);
    assert_eq!(session.stage(), Stage::Idle);
    assert_eq!(channel.disconnect_count(), 1);

    // Still registered, but there is nothing left to disconnect.
    assert!(session.handle_page_event(PageEvent::BeforeUnload).await?);
    assert_eq!(channel.disconnect_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_session_is_reusable() -> Result<()> {
    let (mut session, backend, _, hooks) = session(FakeBackend::new(), FakeChannel::default());

    session.start(RoomSettings::default(), "first").await?;
    let first = session.participant_id().unwrap().to_string();
    session.disconnect().await?;

    session.start(RoomSettings::default(), "second").await?;
    assert_ne!(session.participant_id(), Some(first.as_str()));
    assert_eq!(session.room_id(), Some("second"));
    assert_eq!(backend.created.lock().unwrap().len(), 2);
    assert_eq!(hooks.joined.lock().unwrap().len(), 2);

    tokio::time::timeout(Duration::from_secs(1), session.disconnect()).await??;

    Ok(())
}
