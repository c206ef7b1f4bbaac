//! Rejections and invariant violations for the game layer.

use litoe_protocol::Handle;

use crate::Position;

/// Why the state machine refused an intent.
///
/// Rejections are expected: two clients race, a stale button gets pressed,
/// a handle rejoins. Callers treat them as no-ops and never show them to
/// the end user as errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The coordinates are not on the 3×3 board.
    #[error("position ({row}, {col}) is off the board")]
    OutOfBounds { row: usize, col: usize },

    /// Both seats are taken.
    #[error("room is full")]
    RoomFull,

    /// The handle already holds a seat.
    #[error("{0} has already joined")]
    AlreadyJoined(Handle),

    /// The handle is not seated in this room.
    #[error("{0} is not a player in this room")]
    NotAPlayer(Handle),

    /// Fewer than two players are seated.
    #[error("waiting for an opponent")]
    WaitingForOpponent,

    /// An outcome is already set.
    #[error("game is over")]
    GameOver,

    /// The target cell already holds a mark.
    #[error("cell {0} is occupied")]
    CellOccupied(Position),

    /// The actor does not hold turn authority.
    #[error("not your turn: {expected} to move, {actual} tried")]
    NotYourTurn { expected: Handle, actual: Handle },

    /// Forfeit needs at least two marks on the board.
    #[error("game has not started")]
    GameNotStarted,

    /// There is no rematch offer to accept.
    #[error("no rematch has been offered")]
    NoRematchOffer,

    /// An offer is already waiting for `target` to accept it.
    #[error("rematch already offered to {target}")]
    RematchPending { target: Handle },

    /// Rematches can only be offered once the game has an outcome.
    #[error("game is still in progress")]
    GameInProgress,

    /// Only the lobby's admin operations and the last player leaving may
    /// delete a room.
    #[error("room deletion is not a player action")]
    NotPermitted,

    /// The observed document breaks an invariant, so no transition can be
    /// computed from it.
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] InvariantViolation),
}

/// A room document that breaks one of the [`GameState`](crate::GameState)
/// invariants.
///
/// Transitions produced by the state machine never violate these. A
/// violation means a document was written by something else (a buggy or
/// hostile client, or a hand-edited store).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{0} players seated, at most 2 allowed")]
    TooManyPlayers(usize),

    #[error("{0} is seated twice")]
    DuplicatePlayer(Handle),

    #[error("turn index {0} is out of range")]
    TurnOutOfRange(usize),

    #[error("turn {turn} does not match {marks} marks on the board")]
    TurnOutOfSync { turn: usize, marks: usize },

    #[error("clock for seat {seat} ran out but no outcome is set")]
    ClockExpiredWithoutOutcome { seat: usize },

    #[error("board is decided but no outcome is set")]
    MissingOutcome,
}
