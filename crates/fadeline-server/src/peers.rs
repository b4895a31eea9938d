//! Directory of connected players' outbound channels.

use std::collections::HashMap;

use fadeline_protocol::{PlayerId, ServerMessage};
use fadeline_room::PlayerSender;

/// Every connected player's outbound channel, keyed by id.
///
/// Rooms deliver their own broadcasts; this registry covers direct
/// replies (welcome, room counts) and chat that is not addressed to any
/// live room.
#[derive(Default)]
pub(crate) struct PeerRegistry {
    peers: HashMap<PlayerId, PlayerSender>,
}

impl PeerRegistry {
    pub(crate) fn new() -> Self {
        PeerRegistry::default()
    }

    pub(crate) fn register(&mut self, player: PlayerId, sender: PlayerSender) {
        self.peers.insert(player, sender);
    }

    pub(crate) fn unregister(&mut self, player: PlayerId) {
        self.peers.remove(&player);
    }

    /// Sends to every connected player. Closed channels belong to peers
    /// mid-disconnect and are skipped silently.
    pub(crate) fn broadcast(&self, message: ServerMessage) {
        for sender in self.peers.values() {
            let _ = sender.send(message.clone());
        }
    }

    pub(crate) fn connected(&self) -> usize {
        self.peers.len()
    }
}
