//! Registry of live rooms, keyed by name.
//!
//! Rooms are created on first join and destroyed when their last
//! occupant leaves. The registry also tracks which rooms each player
//! occupies so a dropped connection can be swept out of all of them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fadeline_engine::GameEngine;
use fadeline_protocol::{PlayerId, RpsChoice};

use crate::actor::{LeaveOutcome, PlayerSender, RoomHandle, spawn_room};
use crate::error::RoomError;

/// Command channel depth for each room actor.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

pub struct RoomRegistry {
    engine: Arc<GameEngine>,
    rooms: HashMap<String, RoomHandle>,
    memberships: HashMap<PlayerId, HashSet<String>>,
}

impl RoomRegistry {
    pub fn new(engine: GameEngine) -> Self {
        RoomRegistry {
            engine: Arc::new(engine),
            rooms: HashMap::new(),
            memberships: HashMap::new(),
        }
    }

    /// Returns the named room's handle, spawning its actor if the room
    /// does not exist yet.
    pub fn ensure_room(&mut self, name: &str) -> RoomHandle {
        if let Some(handle) = self.rooms.get(name) {
            return handle.clone();
        }
        tracing::info!(room = %name, "creating room");
        let handle = spawn_room(name.to_string(), self.engine.clone(), DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(name.to_string(), handle.clone());
        handle
    }

    /// Seats a player in the named room, creating it on demand.
    pub async fn join(
        &mut self,
        name: &str,
        player: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let handle = self.ensure_room(name);
        handle.join(player, sender).await?;
        self.memberships
            .entry(player)
            .or_default()
            .insert(name.to_string());
        Ok(())
    }

    /// Routes a move to an existing room. Unknown rooms are an error the
    /// caller may log and otherwise ignore.
    pub async fn make_move(
        &self,
        name: &str,
        player: PlayerId,
        cell: usize,
    ) -> Result<(), RoomError> {
        self.get(name)?.make_move(player, cell).await
    }

    /// Routes a tiebreak choice to an existing room.
    pub async fn play_rps(
        &self,
        name: &str,
        player: PlayerId,
        choice: RpsChoice,
    ) -> Result<(), RoomError> {
        self.get(name)?.play_rps(player, choice).await
    }

    /// Relays a chat line to everyone in an existing room.
    pub async fn chat(&self, name: &str, player: PlayerId, text: String) -> Result<(), RoomError> {
        self.get(name)?.chat(player, text).await
    }

    /// Occupant counts for every live room.
    pub async fn counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::with_capacity(self.rooms.len());
        for (name, handle) in &self.rooms {
            // A room whose actor already stopped is skipped here; the
            // owning player's disconnect sweep drops the stale handle.
            if let Ok(occupants) = handle.occupants().await {
                counts.insert(name.clone(), occupants);
            }
        }
        counts
    }

    /// Removes a player from every room they occupy, destroying rooms
    /// that empty out. Used when a connection drops.
    pub async fn disconnect(&mut self, player: PlayerId) {
        let Some(names) = self.memberships.remove(&player) else {
            return;
        };
        for name in names {
            let Some(handle) = self.rooms.get(&name) else {
                continue;
            };
            match handle.leave(player).await {
                Ok(LeaveOutcome::Emptied) => {
                    self.rooms.remove(&name);
                    tracing::info!(room = %name, "room destroyed");
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(room = %name, %player, %err, "leave failed during disconnect");
                    self.rooms.remove(&name);
                }
            }
        }
    }

    /// Whether the player currently occupies any room.
    pub fn is_member_of(&self, player: PlayerId, name: &str) -> bool {
        self.memberships
            .get(&player)
            .is_some_and(|rooms| rooms.contains(name))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rooms.contains_key(name)
    }

    fn get(&self, name: &str) -> Result<&RoomHandle, RoomError> {
        self.rooms
            .get(name)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))
    }
}
