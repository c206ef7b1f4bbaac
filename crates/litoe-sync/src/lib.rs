//! Replication layer for Litoe.
//!
//! Provides the [`SyncAdapter`] trait that every replication backend
//! implements, plus [`MemorySync`], an in-process adapter used by tests and
//! the hotseat demo.
//!
//! The contract is deliberately weak: documents are replicated eventually,
//! with no transactions and no locks. A plain [`publish`](SyncAdapter::publish)
//! is last-write-wins. [`publish_if`](SyncAdapter::publish_if) adds an
//! optional compare-and-swap on the document version for callers that want
//! stale writes surfaced instead of silently lost.

mod error;
mod memory;

pub use error::SyncError;
pub use memory::MemorySync;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};
use litoe_game::GameState;
use litoe_protocol::RoomId;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Queries and events
// ---------------------------------------------------------------------------

/// Which documents a subscription observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Every room, in the order the rooms were created.
    AllRooms,
    /// A single room. Its snapshot is empty once the room is deleted.
    Room(RoomId),
}

impl Query {
    /// Returns `true` if a change to `room` is visible to this query.
    pub fn matches(&self, room: &RoomId) -> bool {
        match self {
            Self::AllRooms => true,
            Self::Room(id) => id == room,
        }
    }
}

/// One replicated room document.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDoc {
    pub id: RoomId,
    pub state: GameState,
}

/// The settled result of a query at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Matching rooms in discovery order.
    pub rooms: Vec<RoomDoc>,
}

impl Snapshot {
    /// Looks up one room's state.
    pub fn get(&self, id: &RoomId) -> Option<&GameState> {
        self.rooms.iter().find(|doc| &doc.id == id).map(|doc| &doc.state)
    }

    /// Consumes the snapshot, returning one room's state.
    pub fn into_room(self, id: &RoomId) -> Option<GameState> {
        self.rooms
            .into_iter()
            .find(|doc| &doc.id == id)
            .map(|doc| doc.state)
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }
}

/// An event delivered on a [`Subscription`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The first result is not available yet.
    Loading,
    /// Replication failed. No further snapshots will follow.
    Failed(String),
    /// The query's current result.
    Snapshot(Snapshot),
}

/// Document change requested by a writer.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Replace the whole document (creating it if absent).
    Replace(GameState),
    /// Remove the document.
    Delete,
}

impl Write {
    /// The version this write would leave behind, if any.
    pub fn version(&self) -> Option<u64> {
        match self {
            Self::Replace(state) => Some(state.version),
            Self::Delete => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A live stream of [`SyncEvent`]s for one query.
///
/// The stream stays open as long as the adapter that produced it is alive.
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::UnboundedReceiver<SyncEvent>,
}

impl Subscription {
    /// Wraps the receiving half of an adapter's event channel.
    pub fn new(events: mpsc::UnboundedReceiver<SyncEvent>) -> Self {
        Self { events }
    }
}

impl Stream for Subscription {
    type Item = SyncEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<SyncEvent>> {
        self.events.poll_recv(cx)
    }
}

// ---------------------------------------------------------------------------
// Adapter contract
// ---------------------------------------------------------------------------

/// A replication backend for room documents.
///
/// Futures are required to be `Send` so that clients generic over the
/// adapter can run inside spawned Tokio tasks.
pub trait SyncAdapter: Send + Sync + 'static {
    /// Opens a subscription. The first event is always [`SyncEvent::Loading`].
    fn subscribe(&self, query: Query) -> impl Future<Output = Subscription> + Send;

    /// Writes unconditionally. Concurrent writers race; the last one wins.
    fn publish(
        &self,
        room_id: &RoomId,
        write: Write,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Writes only if the stored document is at `expected_version`.
    ///
    /// # Errors
    /// [`SyncError::Conflict`] if another writer got there first,
    /// [`SyncError::NotFound`] if the room is gone.
    fn publish_if(
        &self,
        room_id: &RoomId,
        expected_version: u64,
        write: Write,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Returns a fresh, unguessable room identifier.
    fn allocate_id(&self) -> RoomId;

    /// Returns the first settled snapshot of a fresh subscription.
    ///
    /// # Errors
    /// [`SyncError::Unavailable`] if the subscription reports a failure or
    /// closes before settling.
    fn fetch(&self, query: Query) -> impl Future<Output = Result<Snapshot, SyncError>> + Send {
        async move {
            let mut subscription = self.subscribe(query).await;
            while let Some(event) = subscription.next().await {
                match event {
                    SyncEvent::Loading => continue,
                    SyncEvent::Failed(reason) => return Err(SyncError::Unavailable(reason)),
                    SyncEvent::Snapshot(snapshot) => return Ok(snapshot),
                }
            }
            Err(SyncError::Unavailable("subscription closed".into()))
        }
    }
}

/// Generates a 128-bit random identifier rendered as 32 hex digits.
pub fn random_room_id() -> RoomId {
    let bits: u128 = rand::random();
    RoomId::new(format!("{bits:032x}"))
}
