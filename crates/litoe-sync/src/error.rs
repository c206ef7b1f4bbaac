use litoe_protocol::{ProtocolError, RoomId};

/// Errors that can occur in the replication layer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Replication is lost. Terminal for any client observing through it.
    #[error("replication unavailable: {0}")]
    Unavailable(String),

    /// A conditional write found a different version than expected.
    #[error("room {room} is at version {actual}, expected {expected}")]
    Conflict {
        room: RoomId,
        expected: u64,
        actual: u64,
    },

    /// A conditional write targeted a room that does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A stored document could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] ProtocolError),
}
