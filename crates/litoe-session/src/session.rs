//! The client's own record of who it is and which room it is in.

use litoe_protocol::{Handle, RoomId};
use tracing::debug;

/// One client's session.
///
/// Owned by the caller and passed into lobby operations, which update the
/// current room as the client creates, joins, or leaves rooms. Entering a
/// room does not imply holding a seat in it: a client that fails to join a
/// full room still enters it as a spectator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    handle: Handle,
    current_room: Option<RoomId>,
}

impl ClientSession {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            current_room: None,
        }
    }

    /// A session with a freshly generated handle.
    pub fn random() -> Self {
        Self::new(crate::random_handle())
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The room this client is viewing, if any.
    pub fn current_room(&self) -> Option<&RoomId> {
        self.current_room.as_ref()
    }

    /// Points the session at `room_id`, replacing any previous room.
    pub fn enter(&mut self, room_id: RoomId) {
        debug!(handle = %self.handle, %room_id, "entering room");
        self.current_room = Some(room_id);
    }

    /// Forgets the current room, returning it.
    pub fn clear_room(&mut self) -> Option<RoomId> {
        let previous = self.current_room.take();
        if let Some(room_id) = &previous {
            debug!(handle = %self.handle, %room_id, "left room");
        }
        previous
    }

    /// Returns `true` if the session currently points at `room_id`.
    pub fn is_in(&self, room_id: &RoomId) -> bool {
        self.current_room.as_ref() == Some(room_id)
    }
}
