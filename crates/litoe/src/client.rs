//! The per-room client loop.
//!
//! One Tokio task per observed room multiplexes four inputs:
//!
//! ```text
//!   subscription ──┐
//!   clock timer  ──┼──▶ select! ──▶ lobby.submit / lobby.commit
//!   intents      ──┤          └──▶ watch::Sender<RoomView>
//!   shutdown     ──┘
//! ```
//!
//! Every snapshot re-targets the clock timer at its own version while the
//! local player holds turn authority, and disarms it otherwise. The
//! deadline restarts only when the turn itself changed; a write that leaves
//! turn, seats and board alone keeps the running period. A tick therefore
//! always applies to the newest snapshot; a tick armed for an older version
//! is dropped. Snapshots that break a game invariant are ignored.

use std::sync::Arc;

use futures_util::StreamExt;
use litoe_clock::{ClockConfig, ClockTick, ClockTimer, TurnClock};
use litoe_game::{GameState, Intent, Position, Transition};
use litoe_lobby::{MatchmakingService, Submitted};
use litoe_protocol::{Handle, RoomId};
use litoe_session::ClientSession;
use litoe_sync::{Query, Subscription, SyncAdapter, SyncEvent};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::LitoeError;

const INTENT_CHANNEL_SIZE: usize = 16;

/// What a client currently knows about its room.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomView {
    /// No snapshot yet.
    Loading,
    /// The latest replicated document.
    Live(GameState),
    /// The room was deleted. Terminal.
    Gone,
    /// Replication failed. Terminal.
    Unavailable(String),
}

impl RoomView {
    pub fn state(&self) -> Option<&GameState> {
        match self {
            Self::Live(state) => Some(state),
            _ => None,
        }
    }

    /// Returns `true` once the view can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Gone | Self::Unavailable(_))
    }
}

/// Handle to a running client loop for one room.
///
/// Dropping the handle stops the loop and cancels its clock timer.
pub struct GameClient {
    room_id: RoomId,
    handle: Handle,
    view: watch::Receiver<RoomView>,
    intents: mpsc::Sender<Intent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl GameClient {
    /// Subscribes to `room_id` and spawns the client loop.
    pub(crate) async fn spawn<S: SyncAdapter>(
        lobby: Arc<MatchmakingService<S>>,
        session: ClientSession,
        room_id: RoomId,
        clock: ClockConfig,
    ) -> Self {
        let subscription = lobby.sync().subscribe(Query::Room(room_id.clone())).await;
        let (view_tx, view_rx) = watch::channel(RoomView::Loading);
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_CHANNEL_SIZE);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = session.handle().clone();

        let client_loop = ClientLoop {
            lobby,
            session,
            room_id: room_id.clone(),
            subscription,
            timer: ClockTimer::new(clock),
            latest: None,
            view: view_tx,
        };
        let task = tokio::spawn(client_loop.run(intent_rx, shutdown_rx));

        Self {
            room_id,
            handle,
            view: view_rx,
            intents: intent_tx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The current view.
    pub fn view(&self) -> RoomView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<RoomView> {
        self.view.clone()
    }

    /// Queues an intent for submission against the freshest snapshot.
    ///
    /// Acceptance is observed through the view, not returned here.
    pub async fn send(&self, intent: Intent) -> Result<(), LitoeError> {
        self.intents
            .send(intent)
            .await
            .map_err(|_| LitoeError::ClientClosed)
    }

    /// Queues a move at `position`.
    pub async fn play(&self, position: Position) -> Result<(), LitoeError> {
        self.send(Intent::Move { position }).await
    }

    /// Waits until `ready` holds for the view, returning that view.
    ///
    /// # Errors
    /// [`LitoeError::ClientClosed`] if the loop stops first.
    pub async fn wait_for(
        &mut self,
        mut ready: impl FnMut(&RoomView) -> bool,
    ) -> Result<RoomView, LitoeError> {
        self.view
            .wait_for(|view| ready(view))
            .await
            .map(|view| view.clone())
            .map_err(|_| LitoeError::ClientClosed)
    }

    /// Stops the loop and waits for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for GameClient {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

struct ClientLoop<S: SyncAdapter> {
    lobby: Arc<MatchmakingService<S>>,
    session: ClientSession,
    room_id: RoomId,
    subscription: Subscription,
    timer: ClockTimer,
    /// The last snapshot seen, which every local decision is based on.
    latest: Option<GameState>,
    view: watch::Sender<RoomView>,
}

impl<S: SyncAdapter> ClientLoop<S> {
    async fn run(
        mut self,
        mut intents: mpsc::Receiver<Intent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        tracing::debug!(room_id = %self.room_id, handle = %self.session.handle(), "client started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = self.subscription.next() => {
                    if !self.on_event(event) {
                        break;
                    }
                }
                tick = self.timer.wait_for_tick() => self.on_tick(tick).await,
                Some(intent) = intents.recv() => self.on_intent(intent).await,
            }
        }

        self.timer.disarm();
        tracing::debug!(room_id = %self.room_id, "client stopped");
    }

    /// Handles one subscription event. Returns `false` when the view has
    /// become terminal.
    fn on_event(&mut self, event: Option<SyncEvent>) -> bool {
        match event {
            Some(SyncEvent::Loading) => {
                if self.latest.is_none() {
                    self.view.send_replace(RoomView::Loading);
                }
                true
            }
            Some(SyncEvent::Snapshot(snapshot)) => match snapshot.into_room(&self.room_id) {
                Some(state) => {
                    self.on_snapshot(state);
                    true
                }
                None => {
                    tracing::info!(room_id = %self.room_id, "room deleted");
                    self.finish(RoomView::Gone);
                    false
                }
            },
            Some(SyncEvent::Failed(reason)) => {
                tracing::warn!(room_id = %self.room_id, %reason, "replication unavailable");
                self.finish(RoomView::Unavailable(reason));
                false
            }
            None => {
                tracing::warn!(room_id = %self.room_id, "subscription closed");
                self.finish(RoomView::Unavailable("subscription closed".into()));
                false
            }
        }
    }

    fn on_snapshot(&mut self, state: GameState) {
        if let Err(violation) = state.check_invariants() {
            tracing::warn!(
                room_id = %self.room_id,
                version = state.version,
                %violation,
                "ignoring invalid snapshot"
            );
            self.timer.disarm();
            self.latest = None;
            return;
        }

        let same_turn = self
            .latest
            .as_ref()
            .is_some_and(|prev| is_same_turn(prev, &state));
        if !TurnClock::holds_authority(&state, self.session.handle()) {
            self.timer.disarm();
        } else if same_turn && self.timer.is_armed() {
            self.timer.retarget(state.version);
        } else {
            self.timer.arm(state.version);
        }
        self.latest = Some(state.clone());
        self.view.send_replace(RoomView::Live(state));
    }

    async fn on_tick(&mut self, tick: ClockTick) {
        let Some(base) = self
            .latest
            .as_ref()
            .filter(|state| state.version == tick.armed_for)
        else {
            tracing::debug!(
                room_id = %self.room_id,
                armed_for = tick.armed_for,
                "stale clock tick dropped"
            );
            self.timer.disarm();
            return;
        };

        let Some(next) = TurnClock::tick(base) else {
            self.timer.disarm();
            return;
        };

        let remaining = next.clocks.get(base.turn).copied();
        match self
            .lobby
            .commit(&self.room_id, base, Transition::Update(next))
            .await
        {
            Ok(Submitted::Published(_)) => {
                tracing::trace!(room_id = %self.room_id, tick = tick.tick, ?remaining, "clock ticked");
            }
            Ok(other) => {
                tracing::debug!(room_id = %self.room_id, result = ?other, "clock tick not applied");
            }
            Err(e) => {
                tracing::warn!(room_id = %self.room_id, error = %e, "clock tick failed");
            }
        }
    }

    async fn on_intent(&mut self, intent: Intent) {
        match self.lobby.submit(&self.session, &self.room_id, intent).await {
            Ok(Submitted::Skipped(reason)) => {
                tracing::debug!(room_id = %self.room_id, %reason, "intent skipped");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(room_id = %self.room_id, error = %e, "intent failed");
            }
        }
    }

    fn finish(&mut self, view: RoomView) {
        self.timer.disarm();
        self.latest = None;
        self.view.send_replace(view);
    }
}

/// Returns `true` if `next` continues the same turn as `prev`: same seats,
/// same mover, same board. Clock ticks and unrelated fields may differ.
fn is_same_turn(prev: &GameState, next: &GameState) -> bool {
    prev.turn == next.turn && prev.players == next.players && prev.board == next.board
}
