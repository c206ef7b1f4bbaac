//! Matchmaking service: creates, joins and mutates rooms.

use litoe_game::{GameState, GameStateMachine, Intent, Rejection, ResetOptions, Transition};
use litoe_protocol::{ProtocolError, RoomId};
use litoe_session::ClientSession;
use litoe_sync::{Query, SyncAdapter, SyncError, Write};

use crate::{ConflictPolicy, LobbyConfig, LobbyError, RoomListEntry, list_public_rooms};

/// What happened to a submitted intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// The intent was accepted and this document was published.
    Published(GameState),
    /// The intent was accepted and the room was deleted.
    Deleted,
    /// The intent was rejected. Nothing was published.
    Skipped(Rejection),
    /// Another client wrote first. Nothing was published; the next
    /// snapshot shows what won. Only produced by [`ConflictPolicy::Versioned`].
    Superseded,
}

impl Submitted {
    /// The published document, if any.
    pub fn state(&self) -> Option<&GameState> {
        match self {
            Self::Published(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if the intent changed the shared document.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Published(_) | Self::Deleted)
    }
}

/// Entry point for room operations on behalf of one or more local sessions.
///
/// Every mutating call follows the same cycle: fetch the latest snapshot of
/// the room, run the [`GameStateMachine`] against it, and publish the whole
/// resulting document. Nothing is locked in between.
pub struct MatchmakingService<S: SyncAdapter> {
    sync: S,
    machine: GameStateMachine,
    config: LobbyConfig,
}

impl<S: SyncAdapter> MatchmakingService<S> {
    pub fn new(sync: S, machine: GameStateMachine, config: LobbyConfig) -> Self {
        Self {
            sync,
            machine,
            config,
        }
    }

    pub fn sync(&self) -> &S {
        &self.sync
    }

    pub fn machine(&self) -> &GameStateMachine {
        &self.machine
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Creates a room with the session's handle in seat 0 and enters it.
    pub async fn create_room(
        &self,
        session: &mut ClientSession,
        is_private: bool,
    ) -> Result<RoomId, LobbyError> {
        let room_id = self.sync.allocate_id();
        let empty = self.machine.initial_state(is_private);
        let state = match self.machine.join(&empty, session.handle()) {
            Ok(state) => state,
            Err(reason) => {
                tracing::debug!(%room_id, %reason, "creator not seated");
                empty
            }
        };

        self.sync.publish(&room_id, Write::Replace(state)).await?;
        session.enter(room_id.clone());

        tracing::info!(
            %room_id,
            host = %session.handle(),
            is_private,
            "room created"
        );
        Ok(room_id)
    }

    /// Joins `room_id` and enters it.
    ///
    /// A full room, or one the session already sits in, is not an error:
    /// the result is [`Submitted::Skipped`] and the session watches the
    /// room as a spectator.
    ///
    /// # Errors
    /// [`LobbyError::RoomNotFound`] if the room does not exist.
    pub async fn join_room(
        &self,
        session: &mut ClientSession,
        room_id: &RoomId,
    ) -> Result<Submitted, LobbyError> {
        let result = self.submit(session, room_id, Intent::Join).await?;
        session.enter(room_id.clone());
        Ok(result)
    }

    /// Submits `intent` against `room_id` on behalf of `session`.
    ///
    /// Rejections are logged and returned as [`Submitted::Skipped`].
    ///
    /// # Errors
    /// [`LobbyError::RoomNotFound`] if the room does not exist, or
    /// [`LobbyError::Sync`] if replication fails.
    pub async fn submit(
        &self,
        session: &ClientSession,
        room_id: &RoomId,
        intent: Intent,
    ) -> Result<Submitted, LobbyError> {
        let state = self.fetch_room(room_id).await?;
        let actor = session.handle();

        tracing::trace!(%room_id, %actor, ?intent, version = state.version, "submitting");

        match self.machine.apply(&state, actor, intent) {
            Ok(transition) => self.commit(room_id, &state, transition).await,
            Err(reason) => {
                tracing::debug!(%room_id, %actor, %reason, "intent rejected");
                Ok(Submitted::Skipped(reason))
            }
        }
    }

    /// Publishes an accepted `transition` computed from `base`, honouring
    /// the configured [`ConflictPolicy`].
    pub async fn commit(
        &self,
        room_id: &RoomId,
        base: &GameState,
        transition: Transition,
    ) -> Result<Submitted, LobbyError> {
        let (write, submitted) = match transition {
            Transition::Update(next) => {
                let write = Write::Replace(next.clone());
                (write, Submitted::Published(next))
            }
            Transition::DeleteRoom => (Write::Delete, Submitted::Deleted),
        };

        let result = match self.config.conflict_policy {
            ConflictPolicy::LastWriteWins => self.sync.publish(room_id, write).await,
            ConflictPolicy::Versioned => {
                self.sync.publish_if(room_id, base.version, write).await
            }
        };

        match result {
            Ok(()) => {
                match &submitted {
                    Submitted::Published(state) => tracing::info!(
                        %room_id,
                        version = state.version,
                        status = %state.status(),
                        "room updated"
                    ),
                    _ => tracing::info!(%room_id, "room deleted"),
                }
                Ok(submitted)
            }
            Err(SyncError::Conflict {
                expected, actual, ..
            }) => {
                tracing::debug!(%room_id, expected, actual, "write superseded");
                Ok(Submitted::Superseded)
            }
            Err(SyncError::NotFound(_)) => {
                tracing::debug!(%room_id, "room deleted under write");
                Ok(Submitted::Superseded)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Leaves the session's current room and clears it from the session.
    ///
    /// Spectators leave without touching the document (the result is
    /// `Skipped(NotAPlayer)`). The last seated player leaving deletes the
    /// room.
    ///
    /// # Errors
    /// [`LobbyError::NotInRoom`] if the session has no current room.
    pub async fn leave_room(&self, session: &mut ClientSession) -> Result<Submitted, LobbyError> {
        let room_id = session
            .clear_room()
            .ok_or_else(|| LobbyError::NotInRoom(session.handle().clone()))?;
        self.submit(session, &room_id, Intent::Leave).await
    }

    /// Lists public rooms from a fresh snapshot of all rooms.
    pub async fn list_public_rooms(&self) -> Result<Vec<RoomListEntry>, LobbyError> {
        let snapshot = self.sync.fetch(Query::AllRooms).await?;
        Ok(list_public_rooms(&snapshot))
    }

    /// Fetches the current document of `room_id`.
    ///
    /// # Errors
    /// [`LobbyError::RoomNotFound`] if the room does not exist, or
    /// [`ProtocolError::InvalidDocument`] (through [`LobbyError::Sync`]) if
    /// the stored document breaks a game invariant.
    pub async fn fetch_room(&self, room_id: &RoomId) -> Result<GameState, LobbyError> {
        let state = self.fetch_unchecked(room_id).await?;
        if let Err(violation) = state.check_invariants() {
            tracing::warn!(%room_id, %violation, "invalid room document");
            let invalid = ProtocolError::InvalidDocument(format!("room {room_id}: {violation}"));
            return Err(SyncError::from(invalid).into());
        }
        Ok(state)
    }

    async fn fetch_unchecked(&self, room_id: &RoomId) -> Result<GameState, LobbyError> {
        self.sync
            .fetch(Query::Room(room_id.clone()))
            .await?
            .into_room(room_id)
            .ok_or_else(|| LobbyError::RoomNotFound(room_id.clone()))
    }

    /// Administrative operations, if enabled in [`LobbyConfig`].
    pub fn admin(&self) -> Option<AdminOps<'_, S>> {
        self.config
            .admin_enabled
            .then_some(AdminOps { service: self })
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// Operations that act on rooms regardless of who is seated in them.
///
/// Obtained through [`MatchmakingService::admin`].
pub struct AdminOps<'a, S: SyncAdapter> {
    service: &'a MatchmakingService<S>,
}

impl<S: SyncAdapter> AdminOps<'_, S> {
    /// Deletes every room. Returns how many rooms were deleted.
    pub async fn delete_all_rooms(&self) -> Result<usize, LobbyError> {
        let sync = &self.service.sync;
        let snapshot = sync.fetch(Query::AllRooms).await?;
        for doc in &snapshot.rooms {
            sync.publish(&doc.id, Write::Delete).await?;
        }
        tracing::info!(count = snapshot.len(), "all rooms deleted");
        Ok(snapshot.len())
    }

    /// Starts a fresh game in `room_id` without swapping seats.
    ///
    /// Also repairs a document that breaks a game invariant, as long as it
    /// still decodes and seats at most two players.
    pub async fn reset_room(&self, room_id: &RoomId) -> Result<Submitted, LobbyError> {
        let service = self.service;
        let mut state = service.fetch_unchecked(room_id).await?;
        state.players.truncate(2);
        state.players.dedup();
        let next = service.machine.reset(&state, ResetOptions::default());
        service
            .commit(room_id, &state, Transition::Update(next))
            .await
    }
}
