//! # Litoe
//!
//! Two-player tic-tac-toe with no server. Each room is a single document in
//! a shared, last-write-wins store; every client validates its own intents
//! with the same rules and publishes whole replacement documents.
//!
//! Layers, bottom up:
//!
//! ```text
//! litoe-protocol  ids, marks, codecs
//! litoe-game      board rules, GameState, GameStateMachine
//! litoe-clock     TurnClock rules, ClockTimer
//! litoe-sync      SyncAdapter contract, MemorySync
//! litoe-session   ClientSession, random handles
//! litoe-lobby     MatchmakingService (create / join / list / submit)
//! litoe           config, GameClient loop, unified errors
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use litoe::prelude::*;
//!
//! # async fn demo() -> Result<(), LitoeError> {
//! let litoe = Litoe::builder().build(MemorySync::new());
//!
//! let mut me = ClientSession::random();
//! let room = litoe.lobby().create_room(&mut me, false).await?;
//! let client = litoe.open(me, room).await;
//! client.play(Position::new(1, 1)?).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod telemetry;

pub use client::{GameClient, RoomView};
pub use config::{LitoeConfig, LitoeConfigBuilder};
pub use error::LitoeError;

pub use litoe_clock as clock;
pub use litoe_game as game;
pub use litoe_lobby as lobby;
pub use litoe_protocol as protocol;
pub use litoe_session as session;
pub use litoe_sync as sync;

use std::sync::Arc;

use litoe_game::GameStateMachine;
use litoe_lobby::MatchmakingService;
use litoe_protocol::RoomId;
use litoe_session::ClientSession;
use litoe_sync::SyncAdapter;

/// A configured Litoe instance bound to one replication backend.
///
/// Cheap to clone; clones share the same lobby.
pub struct Litoe<S: SyncAdapter> {
    lobby: Arc<MatchmakingService<S>>,
    config: LitoeConfig,
}

impl<S: SyncAdapter> Clone for Litoe<S> {
    fn clone(&self) -> Self {
        Self {
            lobby: Arc::clone(&self.lobby),
            config: self.config.clone(),
        }
    }
}

impl<S: SyncAdapter> Litoe<S> {
    pub fn new(sync: S, config: LitoeConfig) -> Self {
        let config = config.validated();
        let machine = GameStateMachine::new(config.game.clone());
        let lobby = MatchmakingService::new(sync, machine, config.lobby.clone());
        tracing::debug!(
            clock_secs = config.game.clock_secs,
            conflict_policy = ?config.lobby.conflict_policy,
            "litoe configured"
        );
        Self {
            lobby: Arc::new(lobby),
            config,
        }
    }

    pub fn config(&self) -> &LitoeConfig {
        &self.config
    }

    /// Room operations: create, join, list, submit, leave.
    pub fn lobby(&self) -> &MatchmakingService<S> {
        &self.lobby
    }

    /// Starts a [`GameClient`] watching `room_id` on behalf of `session`.
    ///
    /// Usually called right after creating or joining the room.
    pub async fn open(&self, session: ClientSession, room_id: RoomId) -> GameClient {
        GameClient::spawn(
            Arc::clone(&self.lobby),
            session,
            room_id,
            self.config.clock.clone(),
        )
        .await
    }
}

impl Litoe<litoe_sync::MemorySync> {
    /// Starts building a [`Litoe`] from a default [`LitoeConfig`].
    pub fn builder() -> LitoeBuilder {
        LitoeBuilder::default()
    }
}

/// Builder for a [`Litoe`] instance.
#[derive(Debug, Clone, Default)]
pub struct LitoeBuilder {
    config: LitoeConfig,
}

impl LitoeBuilder {
    /// Replaces the whole configuration.
    pub fn config(mut self, config: LitoeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn game(mut self, game: litoe_game::GameConfig) -> Self {
        self.config.game = game;
        self
    }

    pub fn clock(mut self, clock: litoe_clock::ClockConfig) -> Self {
        self.config.clock = clock;
        self
    }

    pub fn lobby(mut self, lobby: litoe_lobby::LobbyConfig) -> Self {
        self.config.lobby = lobby;
        self
    }

    /// Binds the configuration to a replication backend.
    pub fn build<S: SyncAdapter>(self, sync: S) -> Litoe<S> {
        Litoe::new(sync, self.config)
    }
}

/// Everything needed to drive a game from a client.
pub mod prelude {
    pub use crate::{GameClient, Litoe, LitoeConfig, LitoeError, RoomView};
    pub use litoe_clock::{ClockConfig, TurnClock};
    pub use litoe_game::{
        GameConfig, GameState, GameStatus, Intent, Outcome, Position, Rejection,
    };
    pub use litoe_lobby::{ConflictPolicy, LobbyConfig, RoomListEntry, Submitted};
    pub use litoe_protocol::{Handle, Mark, RoomId};
    pub use litoe_session::{ClientSession, random_handle};
    pub use litoe_sync::{MemorySync, SyncAdapter};
}
