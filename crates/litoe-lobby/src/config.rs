//! Lobby configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConflictPolicy
// ---------------------------------------------------------------------------

/// How the lobby writes a transition back to the shared document.
///
/// ```text
/// LastWriteWins: fetch → validate → publish        (stale writes overwrite)
/// Versioned:     fetch → validate → publish_if(v)  (stale writes rejected)
/// ```
///
/// Under `LastWriteWins`, two clients acting on the same snapshot both
/// succeed and the later write silently replaces the earlier one. Under
/// `Versioned` the second write comes back as
/// [`Submitted::Superseded`](crate::Submitted::Superseded) and the client
/// waits for the next snapshot instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    #[default]
    LastWriteWins,
    Versioned,
}

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`MatchmakingService`](crate::MatchmakingService).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    pub conflict_policy: ConflictPolicy,

    /// Exposes [`AdminOps`](crate::AdminOps). Off by default: admin
    /// operations delete or reset rooms other players are using.
    pub admin_enabled: bool,
}
