//! In-process replication adapter.
//!
//! A single actor task owns every stored document and every subscriber.
//! Handles talk to it through an mpsc channel; no state is shared. Documents
//! are kept encoded, so each subscriber decodes its own copy the way it
//! would after crossing a real network.

use litoe_game::GameState;
use litoe_protocol::{Codec, JsonCodec, RoomId};
use tokio::sync::{mpsc, oneshot};

use crate::{
    Query, RoomDoc, Snapshot, Subscription, SyncAdapter, SyncError, SyncEvent, Write,
    random_room_id,
};

const CHANNEL_SIZE: usize = 64;

/// Commands sent to the store actor.
enum Command {
    Subscribe {
        query: Query,
        events: mpsc::UnboundedSender<SyncEvent>,
    },
    Publish {
        room_id: RoomId,
        expected_version: Option<u64>,
        write: Write,
        reply: oneshot::Sender<Result<(), SyncError>>,
    },
    Fail {
        reason: String,
    },
}

/// Handle to an in-process document store.
///
/// Cheap to clone. Every clone talks to the same store, so clones stand in
/// for separate clients sharing one replicated database. The store stops
/// when the last handle is dropped, which ends all subscriptions.
#[derive(Debug, Clone)]
pub struct MemorySync {
    sender: mpsc::Sender<Command>,
}

impl MemorySync {
    /// Spawns a store that encodes documents as JSON.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }

    /// Spawns a store using `codec` for its stored documents.
    pub fn with_codec<C: Codec>(codec: C) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_SIZE);
        let store = Store {
            codec,
            docs: Vec::new(),
            subscribers: Vec::new(),
            failure: None,
            receiver: rx,
        };
        tokio::spawn(store.run());
        Self { sender: tx }
    }

    /// Simulates losing replication. Every open subscription receives
    /// [`SyncEvent::Failed`], and all later calls fail.
    pub async fn fail(&self, reason: impl Into<String>) {
        let _ = self
            .sender
            .send(Command::Fail {
                reason: reason.into(),
            })
            .await;
    }

    async fn write(
        &self,
        room_id: &RoomId,
        expected_version: Option<u64>,
        write: Write,
    ) -> Result<(), SyncError> {
        let stopped = || SyncError::Unavailable("store stopped".into());
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::Publish {
                room_id: room_id.clone(),
                expected_version,
                write,
                reply: reply_tx,
            })
            .await
            .map_err(|_| stopped())?;
        reply_rx.await.map_err(|_| stopped())?
    }
}

impl Default for MemorySync {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncAdapter for MemorySync {
    async fn subscribe(&self, query: Query) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let command = Command::Subscribe {
            query,
            events: tx.clone(),
        };
        if self.sender.send(command).await.is_err() {
            let _ = tx.send(SyncEvent::Loading);
            let _ = tx.send(SyncEvent::Failed("store stopped".into()));
        }
        Subscription::new(rx)
    }

    async fn publish(&self, room_id: &RoomId, write: Write) -> Result<(), SyncError> {
        self.write(room_id, None, write).await
    }

    async fn publish_if(
        &self,
        room_id: &RoomId,
        expected_version: u64,
        write: Write,
    ) -> Result<(), SyncError> {
        self.write(room_id, Some(expected_version), write).await
    }

    fn allocate_id(&self) -> RoomId {
        random_room_id()
    }
}

// ---------------------------------------------------------------------------
// Store actor
// ---------------------------------------------------------------------------

struct Store<C: Codec> {
    codec: C,
    /// Encoded documents in creation order.
    docs: Vec<(RoomId, Vec<u8>)>,
    subscribers: Vec<(Query, mpsc::UnboundedSender<SyncEvent>)>,
    failure: Option<String>,
    receiver: mpsc::Receiver<Command>,
}

impl<C: Codec> Store<C> {
    async fn run(mut self) {
        tracing::debug!("memory store started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                Command::Subscribe { query, events } => self.handle_subscribe(query, events),
                Command::Publish {
                    room_id,
                    expected_version,
                    write,
                    reply,
                } => {
                    let result = self.handle_publish(&room_id, expected_version, write);
                    if result.is_ok() {
                        self.notify(&room_id);
                    }
                    let _ = reply.send(result);
                }
                Command::Fail { reason } => self.handle_fail(reason),
            }
        }

        tracing::debug!("memory store stopped");
    }

    fn handle_subscribe(&mut self, query: Query, events: mpsc::UnboundedSender<SyncEvent>) {
        let _ = events.send(SyncEvent::Loading);
        if let Some(reason) = &self.failure {
            let _ = events.send(SyncEvent::Failed(reason.clone()));
            return;
        }
        if events.send(SyncEvent::Snapshot(self.snapshot(&query))).is_ok() {
            self.subscribers.push((query, events));
        }
    }

    fn handle_publish(
        &mut self,
        room_id: &RoomId,
        expected_version: Option<u64>,
        write: Write,
    ) -> Result<(), SyncError> {
        if let Some(reason) = &self.failure {
            return Err(SyncError::Unavailable(reason.clone()));
        }

        let slot = self.docs.iter().position(|(id, _)| id == room_id);

        if let Some(expected) = expected_version {
            let index = slot.ok_or_else(|| SyncError::NotFound(room_id.clone()))?;
            let stored: GameState = self.codec.decode(&self.docs[index].1)?;
            if stored.version != expected {
                tracing::debug!(
                    %room_id,
                    expected,
                    actual = stored.version,
                    "conditional write rejected"
                );
                return Err(SyncError::Conflict {
                    room: room_id.clone(),
                    expected,
                    actual: stored.version,
                });
            }
        }

        match write {
            Write::Replace(state) => {
                let bytes = self.codec.encode(&state)?;
                match slot {
                    Some(index) => self.docs[index].1 = bytes,
                    None => self.docs.push((room_id.clone(), bytes)),
                }
                tracing::debug!(%room_id, version = state.version, "document replaced");
            }
            Write::Delete => {
                if let Some(index) = slot {
                    self.docs.remove(index);
                    tracing::debug!(%room_id, "document deleted");
                }
            }
        }
        Ok(())
    }

    fn handle_fail(&mut self, reason: String) {
        tracing::warn!(%reason, subscribers = self.subscribers.len(), "replication lost");
        for (_, events) in self.subscribers.drain(..) {
            let _ = events.send(SyncEvent::Failed(reason.clone()));
        }
        self.failure = Some(reason);
    }

    /// Pushes a fresh snapshot to every subscriber that can see `room_id`.
    /// Subscribers whose receiver is gone are dropped.
    fn notify(&mut self, room_id: &RoomId) {
        let mut subscribers = std::mem::take(&mut self.subscribers);
        subscribers.retain(|(query, events)| {
            if !query.matches(room_id) {
                return !events.is_closed();
            }
            events
                .send(SyncEvent::Snapshot(self.snapshot(query)))
                .is_ok()
        });
        self.subscribers = subscribers;
    }

    fn snapshot(&self, query: &Query) -> Snapshot {
        let rooms = self
            .docs
            .iter()
            .filter(|(id, _)| query.matches(id))
            .filter_map(|(id, bytes)| match self.codec.decode::<GameState>(bytes) {
                Ok(state) => Some(RoomDoc {
                    id: id.clone(),
                    state,
                }),
                Err(e) => {
                    tracing::warn!(room_id = %id, error = %e, "skipping undecodable document");
                    None
                }
            })
            .collect();
        Snapshot { rooms }
    }
}
