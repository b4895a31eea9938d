use thiserror::Error;

/// Errors surfaced when routing a command to a room.
#[derive(Debug, Error)]
pub enum RoomError {
    /// The named room has never been created or was already destroyed.
    #[error("room '{0}' does not exist")]
    NotFound(String),

    /// The room's actor task is gone and can no longer accept commands.
    #[error("room '{0}' is no longer running")]
    Unavailable(String),
}
