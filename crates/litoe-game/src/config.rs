//! Game rule configuration.

use serde::{Deserialize, Serialize};

/// Rule settings shared by every client of a deployment.
///
/// All clients observing the same rooms must agree on these values; the
/// state machine runs independently on each of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Let a seated player move on behalf of their opponent.
    ///
    /// Debugging aid for playing both seats from one client. Never enable
    /// it in a real deployment: it removes turn authority from `Move`.
    pub allow_surrogate_moves: bool,

    /// Starting value of each player's clock, in seconds.
    pub clock_secs: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            allow_surrogate_moves: false,
            clock_secs: Self::DEFAULT_CLOCK_SECS,
        }
    }
}

impl GameConfig {
    /// One minute per player.
    pub const DEFAULT_CLOCK_SECS: u32 = 60;

    /// Fixes out-of-range values. A zero clock would start every game
    /// already timed out, so it is raised to one second.
    pub fn validated(mut self) -> Self {
        if self.clock_secs == 0 {
            self.clock_secs = 1;
        }
        self
    }
}
