//! Top-level configuration and the [`Litoe`](crate::Litoe) builder.

use litoe_clock::ClockConfig;
use litoe_game::GameConfig;
use litoe_lobby::{ConflictPolicy, LobbyConfig};
use serde::{Deserialize, Serialize};

use crate::LitoeError;

/// Every setting a Litoe client needs, in one serializable document.
///
/// All clients sharing a deployment should load the same `game` section;
/// the rules run independently on each of them.
///
/// ```rust
/// use litoe::LitoeConfig;
///
/// let config = LitoeConfig::from_json(r#"{ "game": { "clock_secs": 30 } }"#).unwrap();
/// assert_eq!(config.game.clock_secs, 30);
/// assert!(!config.lobby.admin_enabled);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LitoeConfig {
    pub game: GameConfig,
    pub clock: ClockConfig,
    pub lobby: LobbyConfig,
}

impl LitoeConfig {
    /// Parses a JSON config document. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self, LitoeError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Applies every section's clamping rules.
    pub fn validated(self) -> Self {
        Self {
            game: self.game.validated(),
            clock: self.clock.validated(),
            lobby: self.lobby,
        }
    }
}

/// Builder for a [`LitoeConfig`].
///
/// ```rust
/// use std::time::Duration;
/// use litoe::prelude::*;
///
/// let config = LitoeConfig::builder()
///     .clock_secs(30)
///     .tick_period(Duration::from_millis(500))
///     .conflict_policy(ConflictPolicy::Versioned)
///     .build();
/// assert_eq!(config.game.clock_secs, 30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LitoeConfigBuilder {
    config: LitoeConfig,
}

impl LitoeConfig {
    pub fn builder() -> LitoeConfigBuilder {
        LitoeConfigBuilder::default()
    }
}

impl LitoeConfigBuilder {
    /// Starting value of each player's clock, in seconds.
    pub fn clock_secs(mut self, secs: u32) -> Self {
        self.config.game.clock_secs = secs;
        self
    }

    /// Lets a seated player move for their opponent. Debugging only.
    pub fn allow_surrogate_moves(mut self, allow: bool) -> Self {
        self.config.game.allow_surrogate_moves = allow;
        self
    }

    /// Real time between clock ticks.
    pub fn tick_period(mut self, period: std::time::Duration) -> Self {
        self.config.clock.period = period;
        self
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.config.lobby.conflict_policy = policy;
        self
    }

    pub fn admin_enabled(mut self, enabled: bool) -> Self {
        self.config.lobby.admin_enabled = enabled;
        self
    }

    pub fn build(self) -> LitoeConfig {
        self.config.validated()
    }
}
