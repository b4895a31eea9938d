//! The client/server message sets.
//!
//! Both directions use internally-tagged JSON (`{"type": "...", ...}`),
//! one frame per message, over a single reliable WebSocket. There is no
//! envelope or sequence numbering: the transport already delivers frames
//! in order, and every message is self-describing via its tag.
//!
//! ```text
//! client ──ClientMessage──▶ handler ──commands──▶ room actor
//! client ◀─ServerMessage── writer  ◀─notices──── room actor
//! ```

use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use crate::types::{GameSnapshot, PlayerId, RpsChoice};

/// Bumped whenever the wire format changes incompatibly. Reported to
/// clients in [`ServerMessage::Welcome`] so they can refuse to talk to a
/// server they no longer understand.
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Everything a client may send.
///
/// Field validation happens in two places: shapes here (an unknown tag or
/// a bad `choice` string fails decode and the frame is dropped), and game
/// legality in the engine (an out-of-range or occupied `cell` is silently
/// rejected).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ask for the current room → occupant-count mapping. Reply goes to
    /// the sender only.
    GetRoomCounts,

    /// Join the named room, creating it if this is the first join.
    /// Joining does not leave previously joined rooms.
    JoinRoom { room: String },

    /// Relay a line of chat. An empty `room` targets every connection on
    /// the server rather than one room.
    Chat {
        text: String,
        #[serde(default)]
        room: String,
    },

    /// Claim a board cell for the sender's mark.
    MakeMove { room: String, cell: usize },

    /// Submit a tiebreak choice for the named room.
    PlayRps { room: String, choice: RpsChoice },
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Everything the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// First message on every connection: the server-assigned identity
    /// and the protocol version this server speaks.
    Welcome { player_id: PlayerId, version: u32 },

    /// Reply to [`ClientMessage::GetRoomCounts`].
    RoomCounts { counts: HashMap<String, usize> },

    /// Full room snapshot, broadcast to the room after every accepted
    /// join, move, tiebreak resolution, and timeout.
    GameState { state: GameSnapshot },

    /// Relayed chat, plus server-authored lines: timeout announcements
    /// and the win/lose notices.
    Chat { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mark;

    #[test]
    fn test_client_message_tagging() {
        let json = serde_json::to_string(&ClientMessage::MakeMove {
            room: "lobby".into(),
            cell: 12,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"MakeMove","room":"lobby","cell":12}"#);

        let json = serde_json::to_string(&ClientMessage::GetRoomCounts).unwrap();
        assert_eq!(json, r#"{"type":"GetRoomCounts"}"#);
    }

    #[test]
    fn test_chat_room_defaults_to_empty() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"Chat","text":"hi"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Chat { text: "hi".into(), room: String::new() });
    }

    #[test]
    fn test_play_rps_rejects_unknown_choice() {
        let err = serde_json::from_str::<ClientMessage>(
            r#"{"type":"PlayRps","room":"a","choice":"Lizard"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_unknown_tag_fails_decode() {
        let err = serde_json::from_str::<ClientMessage>(r#"{"type":"Nope"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_game_state_round_trip() {
        let msg = ServerMessage::GameState {
            state: GameSnapshot {
                players: vec![PlayerId(1), PlayerId(2)],
                board: vec![Some(Mark::X), None, None, None],
                turn: 1,
                rps_result: None,
                faded_cell: Some(0),
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_welcome_shape() {
        let json = serde_json::to_string(&ServerMessage::Welcome {
            player_id: PlayerId(9),
            version: PROTOCOL_VERSION,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"Welcome","player_id":9,"version":1}"#);
    }
}
