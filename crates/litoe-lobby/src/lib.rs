//! Matchmaking and the read-validate-publish cycle for Litoe.
//!
//! There is no server holding rooms. A room is one replicated document;
//! every client fetches it, runs the state machine locally, and publishes
//! the result.
//!
//! # Key types
//!
//! - [`MatchmakingService`]: create, join, list, leave and submit intents
//! - [`Submitted`]: what happened to a submitted intent
//! - [`AdminOps`]: bulk delete and reset, only when enabled
//! - [`LobbyConfig`] / [`ConflictPolicy`]: how writes are published

mod config;
mod error;
mod listing;
mod service;

pub use config::{ConflictPolicy, LobbyConfig};
pub use error::LobbyError;
pub use listing::{RoomListEntry, list_public_rooms};
pub use service::{AdminOps, MatchmakingService, Submitted};
