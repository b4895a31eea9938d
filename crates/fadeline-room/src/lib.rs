//! Room runtime for fadeline.
//!
//! Each room is an isolated actor task owning its game state; the
//! [`RoomRegistry`] creates rooms on first join, routes commands to
//! them, and tears them down when the last occupant leaves.

mod actor;
mod error;
mod registry;

pub use actor::{LeaveOutcome, PlayerSender, RoomHandle};
pub use error::RoomError;
pub use registry::{DEFAULT_CHANNEL_SIZE, RoomRegistry};
