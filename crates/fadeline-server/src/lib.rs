//! # fadeline-server
//!
//! The WebSocket front end of fadeline. Accepts connections, assigns
//! player ids, and routes decoded client events into the room runtime:
//!
//! ```text
//!   WsListener --> handler task per connection --> RoomRegistry
//!                      |                              |
//!                      `-- writer pump <-- room actor broadcasts
//! ```
//!
//! Wire frames are JSON in both directions; frames that fail to decode
//! and events that fail game validation are dropped without a reply.

mod config;
mod error;
mod handler;
mod peers;
mod server;
mod ws;

pub use config::{DEFAULT_BIND_ADDR, ServerConfig};
pub use error::ServerError;
pub use server::Server;
pub use ws::{WsConnection, WsListener, WsReader, WsWriter};
