//! The room state proper: everything one game owns.
//!
//! A room's life:
//!
//! ```text
//!   first join            second join           tiebreak resolves
//! ──────────────▶ waiting ─────────────▶ gated ──────────────────▶ playing
//!                                                                     │
//!                      last player leaves: destroyed ◀────────────────┘
//! ```
//!
//! There is no terminal game-over phase: a finished board keeps
//! accepting moves until the room empties. The only gate is the
//! tiebreak result.

use std::collections::VecDeque;

use fadeline_protocol::{GameSnapshot, Mark, PlayerId, RpsChoice, RpsResult};

/// How many pieces of one mark may sit on the board at once. The fifth
/// placement fades the oldest.
pub const MAX_PIECES_PER_MARK: usize = 4;

/// Per-mark FIFO of occupied cell indices, oldest first.
///
/// Invariant: a mark's queue holds exactly the board indices currently
/// showing that mark, in placement order, never more than
/// [`MAX_PIECES_PER_MARK`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MarkQueues {
    x: VecDeque<usize>,
    o: VecDeque<usize>,
}

impl MarkQueues {
    pub(crate) fn of(&mut self, mark: Mark) -> &mut VecDeque<usize> {
        match mark {
            Mark::X => &mut self.x,
            Mark::O => &mut self.o,
        }
    }

    pub(crate) fn get(&self, mark: Mark) -> &VecDeque<usize> {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }
}

/// The pre-game rock-paper-scissors exchange.
///
/// Choices accumulate to two, resolution runs once, and the result is
/// final for the room's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RpsExchange {
    pub(crate) choices: Vec<(PlayerId, RpsChoice)>,
    pub(crate) result: Option<RpsResult>,
}

/// One game's full state, owned exclusively by its room actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Occupants in turn order: index 0 plays X, index 1 plays O,
    /// anyone after that is a spectator. Reordered at most once, by the
    /// tiebreak.
    pub players: Vec<PlayerId>,
    /// Row-major cells; the length is fixed at creation and never
    /// changes.
    pub board: Vec<Option<Mark>>,
    /// Monotonic turn counter; parity selects the active player index
    /// and mark.
    pub turn: u64,
    pub(crate) queues: MarkQueues,
    pub(crate) rps: RpsExchange,
    /// The turn value a turn timer is currently armed for, or `None`.
    /// The actor that owns this room maps it to a concrete deadline;
    /// transitions arm and clear it as part of their state change, which
    /// is what keeps timer bookkeeping atomic with the game mutation.
    pub(crate) armed_timeout: Option<u64>,
}

impl Room {
    /// A fresh room: empty board of `cells` cells, turn zero, no
    /// choices, no timer.
    pub(crate) fn new(cells: usize) -> Self {
        Room {
            players: Vec::new(),
            board: vec![None; cells],
            turn: 0,
            queues: MarkQueues::default(),
            rps: RpsExchange::default(),
            armed_timeout: None,
        }
    }

    pub fn occupants(&self) -> usize {
        self.players.len()
    }

    pub fn rps_result(&self) -> Option<RpsResult> {
        self.rps.result
    }

    /// The turn a timer is armed for, if one is armed.
    pub fn armed_timeout(&self) -> Option<u64> {
        self.armed_timeout
    }

    /// The client-facing view of this room. `faded_cell` annotates the
    /// cell vacated by the transition being broadcast, if any; it is not
    /// stored here.
    pub fn snapshot(&self, faded_cell: Option<usize>) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            board: self.board.clone(),
            turn: self.turn,
            rps_result: self.rps.result,
            faded_cell,
        }
    }
}
