//! Game rules for fadeline: a two-player connect-four-of-N on a square
//! grid where each side's oldest piece fades once they have four on the
//! board, seated order is decided by a rock-paper-scissors tiebreak, and
//! a stalling player's oldest piece can be timed out.
//!
//! The crate is deliberately synchronous and I/O-free:
//!
//! - [`Room`]: one game's state, owned by whoever drives it.
//! - [`GameEngine`]: the transitions, each returning a structured
//!   [`Outcome`] plus outbound notices in delivery order.
//! - [`GameConfig`]: per-deployment grid side and timeout policy.
//!
//! The room runtime in `fadeline-room` wraps a `Room` in an actor task
//! and turns the engine's `armed_timeout` bookkeeping into a real timer;
//! everything rule-shaped lives here where it can be tested without a
//! runtime.

mod board;
mod config;
mod room;
mod rules;

pub use board::{WIN_RUN, find_winning_line, win_lines};
pub use config::GameConfig;
pub use room::{MAX_PIECES_PER_MARK, Room};
pub use rules::{
    GameEngine, LOSE_TEXT, Outcome, Rejection, Transition, WIN_TEXT,
};
