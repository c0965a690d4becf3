use crate::room::{CreateRoomRequest, JoinAck, JoinRequest, ParticipantInfo, RoomDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

/// Limits enforced by the development backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomLimits {
    /// Maximum number of live rooms
    pub max_rooms: usize,
    /// Maximum length of a room id
    pub max_room_id_len: usize,
    /// Maximum length of a participant name
    pub max_name_len: usize,
    /// Seconds a room nobody has joined is kept
    pub unused_room_ttl_secs: u64,
    /// Seconds any room is kept, occupied or not
    pub max_room_age_secs: u64,
    /// Period of the background expiry sweep
    pub expiry_sweep_secs: u64,
}

impl Default for RoomLimits {
    fn default() -> Self {
        Self {
            max_rooms: 10,
            max_room_id_len: 20,
            max_name_len: 25,
            unused_room_ttl_secs: 300,
            max_room_age_secs: 2 * 60 * 60,
            expiry_sweep_secs: 30,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A room with that name already exists")]
    Conflict,

    #[error("Server's meeting limit has been reached, please try again later.")]
    LimitReached,

    #[error("Room name must be shorter than {0} characters")]
    IdTooLong(usize),
}

#[derive(Debug, Clone)]
struct StoredRoom {
    room: RoomDescriptor,
    created_at: DateTime<Utc>,
    has_had_participants: bool,
}

impl StoredRoom {
    fn is_expired(&self, now: DateTime<Utc>, limits: &RoomLimits) -> bool {
        let age = (now - self.created_at).num_seconds();
        let exceeds = |secs: u64| age >= i64::try_from(secs).unwrap_or(i64::MAX);

        exceeds(limits.max_room_age_secs)
            || (!self.has_had_participants && exceeds(limits.unused_room_ttl_secs))
    }
}

/// In-memory room list
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: BTreeMap<String, StoredRoom>,
    limits: RoomLimits,
}

impl RoomRegistry {
    pub fn new(limits: RoomLimits) -> Self {
        Self {
            rooms: BTreeMap::new(),
            limits,
        }
    }

    pub fn limits(&self) -> &RoomLimits {
        &self.limits
    }

    pub fn create(&mut self, request: CreateRoomRequest) -> Result<RoomDescriptor, RegistryError> {
        // Free slots held by abandoned rooms before judging the limit.
        self.expire(Utc::now());

        if self.rooms.contains_key(&request.room_id) {
            return Err(RegistryError::Conflict);
        }
        if self.rooms.len() >= self.limits.max_rooms {
            return Err(RegistryError::LimitReached);
        }
        if request.room_id.chars().count() > self.limits.max_room_id_len {
            return Err(RegistryError::IdTooLong(self.limits.max_room_id_len));
        }

        let room = RoomDescriptor {
            room_id: request.room_id.clone(),
            room_type: Some(request.room_type),
            participants: Vec::new(),
            settings: request.settings,
        };

        info!("Created room {}", room.room_id);

        self.rooms.insert(
            request.room_id,
            StoredRoom {
                room: room.clone(),
                created_at: Utc::now(),
                has_had_participants: false,
            },
        );

        Ok(room)
    }

    pub fn get(&self, room_id: &str) -> Option<RoomDescriptor> {
        self.rooms.get(room_id).map(|stored| stored.room.clone())
    }

    pub fn list(&self) -> Vec<RoomDescriptor> {
        self.rooms.values().map(|stored| stored.room.clone()).collect()
    }

    pub fn created_at(&self, room_id: &str) -> Option<DateTime<Utc>> {
        self.rooms.get(room_id).map(|stored| stored.created_at)
    }

    /// Drop rooms never joined within the unused TTL and rooms past the
    /// maximum age. Returns the ids removed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let expired: Vec<String> = self
            .rooms
            .iter()
            .filter(|(_, stored)| stored.is_expired(now, &self.limits))
            .map(|(room_id, _)| room_id.clone())
            .collect();

        for room_id in &expired {
            info!("Expiring room {}", room_id);
            self.rooms.remove(room_id);
        }

        expired
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Admit a participant, answering the way the channel ack expects.
    pub fn join(&mut self, request: &JoinRequest) -> JoinAck {
        let max_name_len = self.limits.max_name_len;

        let Some(stored) = self.rooms.get_mut(&request.room_id) else {
            return JoinAck::rejected("room not found.");
        };
        let room = &mut stored.room;

        let speakers = room
            .participants
            .iter()
            .filter(|p| !p.is_audience && p.user_id != request.user_id)
            .count();
        if speakers >= room.settings.interface.max_participants {
            return JoinAck::rejected("room is full.");
        }

        if request.name.is_empty() {
            return JoinAck::rejected("name cannot be empty.");
        }
        if request.name.chars().count() > max_name_len {
            return JoinAck::rejected(format!("name cannot exceed {max_name_len} characters."));
        }
        if request.name.contains('/') {
            return JoinAck::rejected("name must not contain '/'");
        }

        stored.has_had_participants = true;
        room.participants.retain(|p| p.user_id != request.user_id);
        room.participants.push(ParticipantInfo {
            user_id: request.user_id.clone(),
            name: Some(request.name.clone()),
            spoken_language: Some(request.spoken_language.clone()),
            caption_languages: request.caption_languages.clone(),
            is_audience: false,
        });

        info!("{} joined room {}", request.user_id, request.room_id);

        JoinAck::accepted()
    }

    /// Remove a participant from every room, dropping rooms left empty.
    pub fn disconnect_user(&mut self, user_id: &str) -> bool {
        let mut emptied = Vec::new();

        for (room_id, stored) in self.rooms.iter_mut() {
            let before = stored.room.participants.len();
            stored.room.participants.retain(|p| p.user_id != user_id);

            if stored.room.participants.len() < before && stored.room.participants.is_empty() {
                emptied.push(room_id.clone());
            }
        }

        for room_id in emptied {
            info!("Closing empty room {}", room_id);
            self.rooms.remove(&room_id);
        }

        true
    }
}
