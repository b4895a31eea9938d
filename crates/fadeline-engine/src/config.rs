//! Game configuration.
//!
//! The grid side and the timeout policy are per-deployment constants: a
//! server hosts one board size, every room shares it, and nothing is
//! negotiated per room.

use std::time::Duration;

/// Per-deployment game parameters.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Board side length. Supported values are 4 and 5; the board is
    /// always `side * side` cells.
    pub side: usize,
    /// Turn timer: if a player stalls this long on their turn, their
    /// oldest piece fades. `None` disables turn timers entirely.
    pub turn_timeout: Option<Duration>,
    /// Whether a fired timeout re-arms the timer for the next turn.
    /// When false the next arm waits for the next join or move.
    pub chain_timeouts: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::grid_five()
    }
}

impl GameConfig {
    /// The 5×5 deployment: 25 cells, no turn timer.
    pub fn grid_five() -> Self {
        GameConfig { side: 5, turn_timeout: None, chain_timeouts: false }
    }

    /// The 4×4 deployment: 16 cells, a 4 second turn timer.
    pub fn grid_four() -> Self {
        GameConfig {
            side: 4,
            turn_timeout: Some(Duration::from_millis(4000)),
            chain_timeouts: false,
        }
    }

    pub fn with_side(mut self, side: usize) -> Self {
        self.side = side;
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn with_chain_timeouts(mut self, chain: bool) -> Self {
        self.chain_timeouts = chain;
        self
    }

    /// Total cell count for this side.
    pub fn cells(&self) -> usize {
        self.side * self.side
    }

    /// Validates the configuration, returning it unchanged on success.
    ///
    /// # Errors
    /// Returns a description of the problem if the side is unsupported
    /// or the timeout combination is contradictory.
    pub fn validated(self) -> Result<Self, String> {
        if self.side != 4 && self.side != 5 {
            return Err(format!(
                "unsupported grid side {} (must be 4 or 5)",
                self.side
            ));
        }
        if self.chain_timeouts && self.turn_timeout.is_none() {
            return Err(
                "chain_timeouts requires a turn_timeout to be set".to_string()
            );
        }
        Ok(self)
    }
}
