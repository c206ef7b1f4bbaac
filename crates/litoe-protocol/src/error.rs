//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding room documents.
///
/// Each Litoe crate defines its own error enum. A `ProtocolError` always
/// means the bytes themselves were the problem, never the game rules or
/// the replication layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a document written by an incompatible client,
    /// missing fields, or truncated data.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The document decoded but is not usable.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
