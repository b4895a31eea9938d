//! JSON codec: the single place where messages meet bytes.
//!
//! Frames are plain JSON so they stay inspectable in browser devtools and
//! in logs. The codec is a value (not free functions) so the server can
//! hold one and thread it through connection handlers uniformly.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes and decodes wire messages as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Serializes a value into a JSON byte frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    /// Deserializes a JSON byte frame back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// truncated, or do not match the expected type. Callers treat a
    /// decode failure as "drop the frame", never as a client-visible
    /// error.
    pub fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
