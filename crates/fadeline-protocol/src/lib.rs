//! Wire protocol for the fadeline game server.
//!
//! This crate defines the language clients and the server speak:
//!
//! - **Types**: the structures that travel on the wire
//!   ([`GameSnapshot`], [`Mark`], [`RpsChoice`], ids).
//! - **Messages**: the tagged unions each side sends
//!   ([`ClientMessage`], [`ServerMessage`]).
//! - **Codec**: how messages become byte frames ([`JsonCodec`]).
//! - **Errors**: what can go wrong doing so ([`ProtocolError`]).
//!
//! The protocol layer sits between the transport (raw frames) and the
//! game (room state). It knows nothing about connections, rooms, or
//! rules; it only fixes the serialized shapes.

mod codec;
mod error;
mod messages;
mod types;

pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientMessage, PROTOCOL_VERSION, ServerMessage};
pub use types::{GameSnapshot, Mark, PlayerId, Recipient, RpsChoice, RpsResult};
