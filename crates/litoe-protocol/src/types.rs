//! Identity types shared by every Litoe layer.
//!
//! These are the values that end up inside a replicated room document and
//! get exchanged between clients: who a player is, which room a document
//! belongs to, and which mark a seat plays.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque identifier for a room.
///
/// Room ids are allocated by the sync layer and exchanged out-of-band
/// (copy/paste, links) to join private rooms. Possessing the id is the
/// only access control there is.
///
/// `#[serde(transparent)]` keeps the wire form a plain string:
/// `RoomId("9f3c...")` serializes as `"9f3c..."`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A player's self-asserted, unverified identity.
///
/// Generated once per client process and never persisted. Two processes
/// may in principle pick the same handle; nothing here prevents it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Wraps a handle string.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Returns the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Handle {
    fn from(handle: &str) -> Self {
        Self::new(handle)
    }
}

// ---------------------------------------------------------------------------
// Mark
// ---------------------------------------------------------------------------

/// One of the two marks a seat places on the board.
///
/// Seat 0 always plays `X` and seat 1 always plays `O`, so the mark is a
/// pure function of the seat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The mark played by seat `index`. Any index other than 0 maps to `O`.
    pub fn for_index(index: usize) -> Self {
        if index == 0 { Self::X } else { Self::O }
    }

    /// The seat index that plays this mark.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::O => 1,
        }
    }

    /// The other mark.
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::O => write!(f, "O"),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
