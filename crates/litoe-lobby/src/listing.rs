//! The public room listing.

use litoe_protocol::{Handle, RoomId};
use litoe_sync::Snapshot;

/// One row of the public lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListEntry {
    pub room_id: RoomId,
    /// The first seated player, if anyone is seated.
    pub host: Option<Handle>,
    pub player_count: usize,
}

impl RoomListEntry {
    /// Returns `true` if a second player can still take a seat.
    pub fn is_open(&self) -> bool {
        self.player_count < 2
    }
}

/// Lists the non-private rooms of `snapshot`, in discovery order.
///
/// Documents that break a game invariant are left out.
pub fn list_public_rooms(snapshot: &Snapshot) -> Vec<RoomListEntry> {
    snapshot
        .rooms
        .iter()
        .filter(|doc| !doc.state.is_private)
        .filter(|doc| match doc.state.check_invariants() {
            Ok(()) => true,
            Err(violation) => {
                tracing::debug!(room_id = %doc.id, %violation, "unlisting invalid room");
                false
            }
        })
        .map(|doc| RoomListEntry {
            room_id: doc.id.clone(),
            host: doc.state.players.first().cloned(),
            player_count: doc.state.players.len(),
        })
        .collect()
}
