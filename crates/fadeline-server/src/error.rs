//! Unified error type for the server binary.

use fadeline_protocol::ProtocolError;
use fadeline_room::RoomError;

/// Top-level error that wraps the lower layers.
///
/// The `#[from]` variants let `?` convert sub-crate errors
/// automatically; the socket variants carry their source directly.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding the listen socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The websocket upgrade handshake failed.
    #[error("websocket handshake failed: {0}")]
    Handshake(#[source] tokio_tungstenite::tungstenite::Error),

    /// Writing a frame to a peer failed.
    #[error("send failed: {0}")]
    Send(#[source] tokio_tungstenite::tungstenite::Error),

    /// Reading a frame from a peer failed.
    #[error("receive failed: {0}")]
    Receive(#[source] tokio_tungstenite::tungstenite::Error),

    /// An encode or decode error from the wire codec.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room routing error.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}
