//! Unified error type for Litoe.

use litoe_game::{InvariantViolation, Rejection};
use litoe_lobby::LobbyError;
use litoe_protocol::ProtocolError;
use litoe_sync::SyncError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so `?`
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LitoeError {
    /// Encoding or decoding a room document failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An intent was refused by the rules.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// A document breaks a structural invariant.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// The replication layer failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A lobby operation failed.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// A configuration document could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// The game client task has stopped.
    #[error("game client stopped")]
    ClientClosed,
}
