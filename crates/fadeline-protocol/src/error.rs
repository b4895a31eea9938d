//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum; a
//! `ProtocolError` always means serialization trouble, never networking
//! or room management.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed. Rare in practice: every wire type here
    /// serializes infallibly unless memory runs out.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown message tag, a
    /// missing field, or a value of the wrong type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
