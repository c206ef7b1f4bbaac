//! Error types for the lobby layer.
//!
//! Rejected intents are not errors here: they come back as
//! [`Submitted::Skipped`](crate::Submitted::Skipped).

use litoe_protocol::{Handle, RoomId};
use litoe_sync::SyncError;

/// Errors that can occur during lobby operations.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The room does not exist (never created, or already deleted).
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The session is not in any room.
    #[error("{0} is not in a room")]
    NotInRoom(Handle),

    /// The replication layer failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
}
