//! Codec trait and implementations for room documents.
//!
//! A codec turns a document into the bytes a replication layer stores and
//! back. Adapters are generic over [`Codec`], so swapping JSON for a binary
//! format touches nothing above the sync layer.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because adapters keep their codec inside
/// long-lived Tokio tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Human-readable, which makes replicated documents easy to inspect while
/// debugging. Behind the `json` feature (enabled by default).
///
/// ## Example
///
/// ```rust
/// use litoe_protocol::{Codec, Handle, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Handle::new("ann")).unwrap();
/// let back: Handle = codec.decode(&bytes).unwrap();
/// assert_eq!(back, Handle::new("ann"));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
