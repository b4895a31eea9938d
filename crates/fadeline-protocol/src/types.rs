//! Core wire types shared by every layer of the server.
//!
//! Everything here either travels on the wire verbatim (marks, RPS enums,
//! the room snapshot) or addresses where a message should go
//! ([`Recipient`]). The types are deliberately small: the game rules live
//! in the engine crate, this module only fixes their serialized shape.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for one connected player.
///
/// Assigned by the server when the connection is accepted and reported to
/// the client in the `Welcome` message. The id doubles as the session
/// identity: there is no separate account or reconnect token, so a player
/// who drops and reconnects is simply a new player.
///
/// `#[serde(transparent)]` serializes this as the bare `u64`, so a
/// `PlayerId(42)` is just `42` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Marks and turns
// ---------------------------------------------------------------------------

/// A player's mark on the board.
///
/// The first entry of a room's player list plays `X`, the second plays
/// `O`. Board cells are `Option<Mark>`, so an empty cell serializes as
/// `null` and an occupied one as `"X"` or `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The mark whose turn it is for a given turn-counter value.
    ///
    /// Turn parity is the whole scheme: even turns are `X`, odd turns are
    /// `O`. Clients derive the active mark from the snapshot's `turn` with
    /// the same rule.
    pub fn for_turn(turn: u64) -> Mark {
        if turn % 2 == 0 { Mark::X } else { Mark::O }
    }

    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rock-paper-scissors
// ---------------------------------------------------------------------------

/// One player's choice in the pre-game rock-paper-scissors tiebreak.
///
/// Arriving as a closed enum means a malformed choice never reaches the
/// game rules: anything that is not one of these three strings fails to
/// decode and the frame is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpsChoice {
    Rock,
    Paper,
    Scissors,
}

impl RpsChoice {
    /// The standard beats relation: rock beats scissors, scissors beats
    /// paper, paper beats rock.
    pub fn beats(self, other: RpsChoice) -> bool {
        matches!(
            (self, other),
            (RpsChoice::Rock, RpsChoice::Scissors)
                | (RpsChoice::Scissors, RpsChoice::Paper)
                | (RpsChoice::Paper, RpsChoice::Rock)
        )
    }
}

impl fmt::Display for RpsChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpsChoice::Rock => write!(f, "rock"),
            RpsChoice::Paper => write!(f, "paper"),
            RpsChoice::Scissors => write!(f, "scissors"),
        }
    }
}

/// The settled outcome of a room's tiebreak.
///
/// A room starts with no result; the result is set exactly once, when the
/// second choice arrives. `Draw` still opens the game: the join order
/// stands and the first joiner moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum RpsResult {
    Draw,
    Winner { player: PlayerId },
}

// ---------------------------------------------------------------------------
// Recipient: where a notice should be delivered
// ---------------------------------------------------------------------------

/// Addressing for one outbound message produced by a game transition.
///
/// Transitions return `(Recipient, ServerMessage)` pairs in delivery
/// order; the room runtime resolves `All` against the room's occupant
/// list and `Player` against one outbound channel. This type never goes
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every occupant of the room.
    All,
    /// One specific player.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Room snapshot
// ---------------------------------------------------------------------------

/// The client-facing view of one room, broadcast after every accepted
/// transition.
///
/// `faded_cell` is transient: it names the board index vacated by this
/// transition's fade (a fifth placement or a turn timeout) so clients can
/// animate the disappearing piece. It is not part of persisted room state
/// and is omitted from snapshots where nothing faded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Occupants in turn order: index 0 plays X, index 1 plays O. Any
    /// further entries are spectators.
    pub players: Vec<PlayerId>,
    /// Row-major cells, side × side of them, fixed for the room lifetime.
    pub board: Vec<Option<Mark>>,
    /// Monotonic turn counter; parity selects the active player and mark.
    pub turn: u64,
    /// `None` until the tiebreak resolves; moves are rejected while unset.
    pub rps_result: Option<RpsResult>,
    /// Board index whose piece vanished in this transition, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faded_cell: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_transparently() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
        let back: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(back, PlayerId(42));
    }

    #[test]
    fn test_mark_for_turn_parity() {
        assert_eq!(Mark::for_turn(0), Mark::X);
        assert_eq!(Mark::for_turn(1), Mark::O);
        assert_eq!(Mark::for_turn(2), Mark::X);
        assert_eq!(Mark::for_turn(17), Mark::O);
    }

    #[test]
    fn test_board_cells_serialize_as_null_or_mark() {
        let cells: Vec<Option<Mark>> = vec![None, Some(Mark::X), Some(Mark::O)];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,"X","O"]"#);
    }

    #[test]
    fn test_beats_relation_is_a_cycle() {
        use RpsChoice::*;
        assert!(Rock.beats(Scissors));
        assert!(Scissors.beats(Paper));
        assert!(Paper.beats(Rock));
        assert!(!Scissors.beats(Rock));
        assert!(!Paper.beats(Scissors));
        assert!(!Rock.beats(Paper));
        assert!(!Rock.beats(Rock));
    }

    #[test]
    fn test_rps_result_tagging() {
        let draw = serde_json::to_string(&RpsResult::Draw).unwrap();
        assert_eq!(draw, r#"{"outcome":"Draw"}"#);
        let win =
            serde_json::to_string(&RpsResult::Winner { player: PlayerId(7) })
                .unwrap();
        assert_eq!(win, r#"{"outcome":"Winner","player":7}"#);
    }

    #[test]
    fn test_snapshot_omits_faded_cell_when_absent() {
        let snap = GameSnapshot {
            players: vec![PlayerId(1)],
            board: vec![None; 4],
            turn: 0,
            rps_result: None,
            faded_cell: None,
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(!json.contains("faded_cell"));

        let faded = GameSnapshot { faded_cell: Some(3), ..snap };
        let json = serde_json::to_string(&faded).unwrap();
        assert!(json.contains(r#""faded_cell":3"#));
    }
}
