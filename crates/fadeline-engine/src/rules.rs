//! The game transitions: join, move, tiebreak, timeout, leave.
//!
//! Every transition takes `&mut Room` plus its input and returns a
//! [`Transition`]: a structured [`Outcome`] and the outbound notices to
//! deliver, in order. Nothing here is async and nothing does I/O; the
//! room actor applies these under its single-writer loop and delivers
//! the notices afterwards, which is what makes each transition atomic
//! per room.
//!
//! Illegal requests are rejected silently on the wire: a rejection
//! carries no notices. The [`Rejection`] reason exists for logs and
//! tests only.

use fadeline_protocol::{
    Mark, PlayerId, Recipient, RpsChoice, RpsResult, ServerMessage,
};

use crate::board::{find_winning_line, win_lines};
use crate::config::GameConfig;
use crate::room::{MAX_PIECES_PER_MARK, Room};

/// Direct message sent to the player whose move completed a line.
pub const WIN_TEXT: &str = "** You win! **";
/// Direct message sent to the other seated player.
pub const LOSE_TEXT: &str = "** You lose! **";

// ---------------------------------------------------------------------------
// Transition results
// ---------------------------------------------------------------------------

/// Why a request changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("cell index out of range")]
    OutOfRange,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("cell is already occupied")]
    CellOccupied,
    #[error("tiebreak has not resolved yet")]
    TiebreakPending,
    #[error("tiebreak already resolved")]
    TiebreakSettled,
    #[error("player already has a pending tiebreak choice")]
    ChoicePending,
    #[error("player is not in this room")]
    NotAMember,
    #[error("timer fired for a stale turn")]
    StaleTimer,
    #[error("room does not have exactly two players")]
    NotTwoPlayers,
    #[error("active mark has no pieces to fade")]
    NothingToFade,
}

/// What a transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed; notices describe it.
    Accepted,
    /// The move completed a winning line. State changed and the win and
    /// lose notices follow the state broadcast.
    Won { winner: PlayerId },
    /// Nothing changed and nothing is sent.
    Rejected(Rejection),
    /// A leave removed the last player; the caller must destroy the
    /// room.
    RoomEmptied,
}

/// One applied (or refused) transition: the outcome plus the outbound
/// notices, already in delivery order.
#[derive(Debug)]
pub struct Transition {
    pub outcome: Outcome,
    pub notices: Vec<(Recipient, ServerMessage)>,
}

impl Transition {
    fn accepted(notices: Vec<(Recipient, ServerMessage)>) -> Self {
        Transition { outcome: Outcome::Accepted, notices }
    }

    fn rejected(why: Rejection) -> Self {
        Transition { outcome: Outcome::Rejected(why), notices: Vec::new() }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.outcome, Outcome::Rejected(_))
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The rules of the game, parameterized by [`GameConfig`].
///
/// One engine serves every room of a deployment: it owns the generated
/// winning-line table for the configured side and applies transitions to
/// rooms it is handed. It holds no room state itself.
#[derive(Debug)]
pub struct GameEngine {
    config: GameConfig,
    lines: Vec<[usize; 4]>,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        let lines = win_lines(config.side);
        GameEngine { config, lines }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// A fresh room sized for this deployment.
    pub fn new_room(&self) -> Room {
        Room::new(self.config.cells())
    }

    /// Seats a player (or spectator) and broadcasts the grown room.
    ///
    /// The turn timer arms only when this join brings the room to
    /// exactly two players; a spectator joining later neither arms nor
    /// cancels anything.
    pub fn join(&self, room: &mut Room, player: PlayerId) -> Transition {
        room.players.push(player);
        let notices = vec![state_notice(room, None)];
        if room.occupants() == 2 && self.config.turn_timeout.is_some() {
            room.armed_timeout = Some(room.turn);
        }
        Transition::accepted(notices)
    }

    /// Claims a cell for the active player's mark.
    ///
    /// On the fifth placement of a mark the oldest piece of that mark
    /// fades first; the vacated index rides along on the state
    /// broadcast. A completed line ends with direct win/lose notices
    /// after the state broadcast, attributed by turn parity to the
    /// mover. The board is never reset: play may continue in the same
    /// room even after a win.
    pub fn make_move(
        &self,
        room: &mut Room,
        player: PlayerId,
        cell: usize,
    ) -> Transition {
        if cell >= room.board.len() {
            return Transition::rejected(Rejection::OutOfRange);
        }
        let active = (room.turn % 2) as usize;
        if room.players.get(active) != Some(&player) {
            return Transition::rejected(Rejection::NotYourTurn);
        }
        if room.board[cell].is_some() {
            return Transition::rejected(Rejection::CellOccupied);
        }
        if room.rps.result.is_none() {
            return Transition::rejected(Rejection::TiebreakPending);
        }

        let mark = Mark::for_turn(room.turn);

        // Fade before placing: a fifth piece pushes out the oldest.
        let faded = if room.queues.of(mark).len() >= MAX_PIECES_PER_MARK {
            room.queues.of(mark).pop_front()
        } else {
            None
        };
        if let Some(oldest) = faded {
            room.board[oldest] = None;
        }

        room.armed_timeout = None;
        room.board[cell] = Some(mark);
        room.queues.of(mark).push_back(cell);
        room.turn += 1;

        let mut notices = vec![state_notice(room, faded)];

        if find_winning_line(&room.board, &self.lines).is_some() {
            // Post-increment parity: (turn + 1) % 2 is the mover who just
            // played, turn % 2 the player now due to move.
            let winner = room.players.get(((room.turn + 1) % 2) as usize).copied();
            let loser = room.players.get((room.turn % 2) as usize).copied();
            if let Some(w) = winner {
                notices.push((
                    Recipient::Player(w),
                    ServerMessage::Chat { text: WIN_TEXT.to_string() },
                ));
            }
            if let Some(l) = loser {
                notices.push((
                    Recipient::Player(l),
                    ServerMessage::Chat { text: LOSE_TEXT.to_string() },
                ));
            }
            if let Some(w) = winner {
                return Transition { outcome: Outcome::Won { winner: w }, notices };
            }
            return Transition { outcome: Outcome::Accepted, notices };
        }

        if room.occupants() == 2 && self.config.turn_timeout.is_some() {
            room.armed_timeout = Some(room.turn);
        }
        Transition::accepted(notices)
    }

    /// Records a tiebreak choice; the second choice resolves the
    /// exchange.
    ///
    /// Resolution happens exactly once per room: equal choices settle as
    /// a draw (join order stands), otherwise the winner moves to the
    /// front of the turn order. Either way the choices are discarded and
    /// the settled room is broadcast. Later choices, duplicates from one
    /// player, and choices from non-members change nothing.
    pub fn play_rps(
        &self,
        room: &mut Room,
        player: PlayerId,
        choice: RpsChoice,
    ) -> Transition {
        if !room.players.contains(&player) {
            return Transition::rejected(Rejection::NotAMember);
        }
        if room.rps.result.is_some() {
            return Transition::rejected(Rejection::TiebreakSettled);
        }
        if room.rps.choices.iter().any(|(p, _)| *p == player) {
            return Transition::rejected(Rejection::ChoicePending);
        }

        room.rps.choices.push((player, choice));
        if room.rps.choices.len() < 2 {
            return Transition::accepted(Vec::new());
        }

        let (first_player, first_choice) = room.rps.choices[0];
        let (second_player, second_choice) = room.rps.choices[1];
        let result = if first_choice == second_choice {
            RpsResult::Draw
        } else if first_choice.beats(second_choice) {
            RpsResult::Winner { player: first_player }
        } else {
            RpsResult::Winner { player: second_player }
        };

        if let RpsResult::Winner { player: winner } = result {
            // The winner moves first: rotate them to the front of the
            // turn order without touching membership.
            if let Some(pos) = room.players.iter().position(|p| *p == winner) {
                let w = room.players.remove(pos);
                room.players.insert(0, w);
            }
        }

        room.rps.choices.clear();
        room.rps.result = Some(result);
        Transition::accepted(vec![state_notice(room, None)])
    }

    /// Applies a fired turn timer.
    ///
    /// The arm is consumed unconditionally; the mutation only happens if
    /// the room still has exactly two players and the turn matches the
    /// value the timer was armed for. A fire that was already in flight
    /// when a move landed first fails the turn check and becomes a no-op.
    pub fn timeout_fire(
        &self,
        room: &mut Room,
        scheduled_turn: u64,
    ) -> Transition {
        room.armed_timeout = None;
        if room.occupants() != 2 {
            return Transition::rejected(Rejection::NotTwoPlayers);
        }
        if room.turn != scheduled_turn {
            return Transition::rejected(Rejection::StaleTimer);
        }

        let mark = Mark::for_turn(room.turn);
        let Some(oldest) = room.queues.of(mark).pop_front() else {
            return Transition::rejected(Rejection::NothingToFade);
        };
        room.board[oldest] = None;
        room.turn += 1;

        if self.config.chain_timeouts
            && self.config.turn_timeout.is_some()
            && room.occupants() == 2
        {
            room.armed_timeout = Some(room.turn);
        }

        let notices = vec![
            state_notice(room, Some(oldest)),
            (
                Recipient::All,
                ServerMessage::Chat { text: format!("** {mark} timed out! **") },
            ),
        ];
        Transition::accepted(notices)
    }

    /// Removes a player; an absent player is a no-op.
    ///
    /// Emptying the room yields [`Outcome::RoomEmptied`] with no
    /// notices: the caller destroys the room and its timer dies with the
    /// actor. Otherwise the shrunk room is broadcast; the game
    /// effectively halts once a seat is gone, because the turn guard in
    /// [`GameEngine::make_move`] can no longer match the missing index.
    pub fn leave(&self, room: &mut Room, player: PlayerId) -> Transition {
        let Some(pos) = room.players.iter().position(|p| *p == player) else {
            return Transition::rejected(Rejection::NotAMember);
        };
        room.players.remove(pos);

        if room.players.is_empty() {
            room.armed_timeout = None;
            return Transition { outcome: Outcome::RoomEmptied, notices: Vec::new() };
        }
        Transition::accepted(vec![state_notice(room, None)])
    }
}

fn state_notice(
    room: &Room,
    faded_cell: Option<usize>,
) -> (Recipient, ServerMessage) {
    (
        Recipient::All,
        ServerMessage::GameState { state: room.snapshot(faded_cell) },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
