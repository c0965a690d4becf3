use super::config::SessionConfig;
use super::error::{ErrorNotice, RoomError};
use super::messages::{CreateRoomRequest, DisconnectRequest, JoinRequest, RoomDescriptor, RoomSettings};
use super::ports::{Channel, LoggingHooks, RoomBackend, SessionHooks};
use super::stage::{PageEvent, Stage};
use crate::ids;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A participant's membership in one room.
///
/// Walks `Idle -> CreatingRoom -> Subscribing -> FetchingRoom -> Joining ->
/// Joined` on [`start`](Self::start) and back to `Idle` on a confirmed
/// disconnect. Every operation takes `&mut self`, so a disconnect can never
/// interleave with a join that is still waiting for its acknowledgment.
pub struct RoomSession {
    /// Session configuration
    config: SessionConfig,

    /// REST side: create and look up rooms
    backend: Arc<dyn RoomBackend>,

    /// Channel side: presence, join, disconnect
    channel: Arc<dyn Channel>,

    hooks: Arc<dyn SessionHooks>,

    stage: Stage,

    /// Set for the whole attempt, cleared only once a disconnect is confirmed
    participant_id: Option<String>,

    room_id: Option<String>,

    /// Snapshot returned by the backend before joining
    room: Option<RoomDescriptor>,

    /// Page events that trigger a disconnect; registered on first join
    page_triggers: Vec<PageEvent>,
}

impl RoomSession {
    pub fn new(
        config: SessionConfig,
        backend: Arc<dyn RoomBackend>,
        channel: Arc<dyn Channel>,
    ) -> Self {
        Self {
            config,
            backend,
            channel,
            hooks: Arc::new(LoggingHooks),
            stage: Stage::Idle,
            participant_id: None,
            room_id: None,
            room: None,
            page_triggers: Vec::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Create (or reuse) `room_id` on the backend and join it.
    ///
    /// Failures before the join request is sent are reported through
    /// [`SessionHooks::on_error`] tagged with the current stage, followed by a
    /// best-effort disconnect that leaves the session idle. A rejected join
    /// leaves the session attached unless
    /// [`SessionConfig::disconnect_on_join_rejected`] is set.
    pub async fn start(&mut self, settings: RoomSettings, room_id: &str) -> Result<(), RoomError> {
        if let Some(participant_id) = &self.participant_id {
            return Err(RoomError::AlreadyActive {
                participant_id: participant_id.clone(),
            });
        }

        let participant_id = ids::participant_id(&self.config.user_id_prefix);
        info!("Starting session {} in room {}", participant_id, room_id);

        self.participant_id = Some(participant_id.clone());
        self.room_id = Some(room_id.to_string());
        self.set_stage(Stage::CreatingRoom);

        let room = match self.prepare_room(settings, room_id).await {
            Ok(room) => room,
            Err(err) => {
                self.abort_start(&err).await;
                return Err(err);
            }
        };

        self.room = Some(room.clone());
        self.set_stage(Stage::Joining);

        let request = JoinRequest {
            spoken_language: self.config.spoken_language.clone(),
            caption_languages: vec![self.config.caption_language.clone()],
            name: participant_id.clone(),
            user_id: participant_id,
            room_id: room.room_id.clone(),
        };

        let ack = match self.acked("/join", self.channel.join(&request)).await {
            Ok(ack) => ack,
            Err(err) => {
                self.abort_start(&err).await;
                return Err(err);
            }
        };

        if !ack.could_join {
            let err = RoomError::JoinRejected {
                room_id: room.room_id.clone(),
                message: ack.error_message.unwrap_or_default(),
            };
            warn!("Join rejected: {}", err);

            if self.config.disconnect_on_join_rejected {
                self.cleanup().await;
            }
            return Err(err);
        }

        self.set_stage(Stage::Joined);
        debug!(
            "Join replayed {} history entries, {} reactions",
            ack.history.len(),
            ack.reactions.len()
        );

        for event in PageEvent::ALL {
            if !self.page_triggers.contains(&event) {
                self.page_triggers.push(event);
            }
        }

        self.hooks.on_joined(&room);

        Ok(())
    }

    /// Steps 1-3: create the room, announce presence, fetch the room back.
    async fn prepare_room(
        &mut self,
        settings: RoomSettings,
        room_id: &str,
    ) -> Result<RoomDescriptor, RoomError> {
        let request = CreateRoomRequest {
            room_id: room_id.to_string(),
            room_type: self.config.room_type.clone(),
            settings,
        };

        self.backend
            .create_room(&request)
            .await
            .map_err(|e| RoomError::RoomCreation {
                room_id: room_id.to_string(),
                reason: format!("{e:#}"),
            })?;

        self.set_stage(Stage::Subscribing);
        self.channel
            .notify_page(&format!("room/{room_id}"))
            .await
            .map_err(|e| RoomError::Transport {
                operation: "on-page",
                reason: format!("{e:#}"),
            })?;

        self.set_stage(Stage::FetchingRoom);
        let lookup = self
            .backend
            .get_room(room_id)
            .await
            .map_err(|e| RoomError::RoomLookup {
                room_id: room_id.to_string(),
                reason: format!("{e:#}"),
            })?;

        lookup.room.ok_or_else(|| RoomError::NullRoom {
            room_id: room_id.to_string(),
        })
    }

    async fn abort_start(&mut self, err: &RoomError) {
        let notice = ErrorNotice {
            stage: self.stage,
            error: err.clone(),
        };
        error!("Caught error: {}", notice);
        self.hooks.on_error(&notice);

        self.cleanup().await;
    }

    /// Best-effort disconnect. Local state is dropped even if the backend
    /// does not confirm.
    async fn cleanup(&mut self) {
        if let Err(e) = self.try_disconnect().await {
            warn!("Cleanup disconnect failed, dropping session anyway: {}", e);
            self.reset();
        }
    }

    /// Leave the room, reporting failure to the caller.
    ///
    /// Does nothing when no session is active. If the backend does not
    /// confirm, the session stays attached so the caller can retry.
    pub async fn try_disconnect(&mut self) -> Result<(), RoomError> {
        let Some(participant_id) = self.participant_id.clone() else {
            debug!("Disconnect requested with no active session");
            return Ok(());
        };

        info!("Disconnecting {} (stage: {})", participant_id, self.stage);

        let request = DisconnectRequest {
            user_id: participant_id.clone(),
        };
        let acknowledged = self
            .acked("disconnect-user", self.channel.disconnect_user(&request))
            .await?;

        if !acknowledged {
            return Err(RoomError::DisconnectAck {
                participant_id,
                room_id: self.room_id.clone().unwrap_or_default(),
            });
        }

        self.reset();
        info!("Disconnected {}", participant_id);

        Ok(())
    }

    /// Leave the room; a failure here is unrecoverable for the caller.
    pub async fn disconnect(&mut self) -> anyhow::Result<()> {
        self.try_disconnect().await.map_err(|e| {
            error!("Disconnect failed: {}", e);
            anyhow::Error::new(e).context("Failed to leave room")
        })
    }

    /// Forward a page lifecycle event. Returns whether it triggered a disconnect.
    pub async fn handle_page_event(&mut self, event: PageEvent) -> anyhow::Result<bool> {
        if !self.page_triggers.contains(&event) {
            return Ok(false);
        }

        debug!("Page event {:?} triggers disconnect", event);
        self.disconnect().await?;

        Ok(true)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn participant_id(&self) -> Option<&str> {
        self.participant_id.as_deref()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn room(&self) -> Option<&RoomDescriptor> {
        self.room.as_ref()
    }

    pub fn is_joined(&self) -> bool {
        self.stage == Stage::Joined
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        info!("Room session stage: {}", stage);
        self.hooks.on_stage(stage);
    }

    fn reset(&mut self) {
        self.room = None;
        self.room_id = None;
        self.participant_id = None;
        self.set_stage(Stage::Idle);
    }

    /// Await a channel acknowledgment, bounded by the configured timeout.
    async fn acked<T>(
        &self,
        operation: &'static str,
        request: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, RoomError> {
        match tokio::time::timeout(self.config.ack_timeout(), request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(RoomError::Transport {
                operation,
                reason: format!("{e:#}"),
            }),
            Err(_) => Err(RoomError::AckTimeout {
                operation,
                timeout_ms: self.config.ack_timeout_ms,
            }),
        }
    }
}
