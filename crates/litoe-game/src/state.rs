//! The room document and the invariants it must satisfy.

use std::fmt;

use litoe_protocol::{Handle, Mark};
use serde::{Deserialize, Serialize};

use crate::board::{self, Board};
use crate::{GameConfig, InvariantViolation};

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The named player won (line, timeout, or opponent forfeit).
    Winner(Handle),
    /// The board filled with no line.
    Draw,
}

impl Outcome {
    /// The winning handle, or `None` for a draw.
    pub fn winner(&self) -> Option<&Handle> {
        match self {
            Self::Winner(h) => Some(h),
            Self::Draw => None,
        }
    }
}

/// The replicated state of one room.
///
/// Every client holds its own copy, computes transitions against it, and
/// publishes whole replacements. None of them is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    /// Seat index (0 or 1) whose mark is active.
    pub turn: usize,
    /// Seated handles in seat order; seat 0 plays `X`.
    pub players: Vec<Handle>,
    /// Remaining seconds per seat.
    pub clocks: [u32; 2],
    pub outcome: Option<Outcome>,
    /// The handle that must accept the pending rematch offer.
    pub rematch_offer: Option<Handle>,
    /// Hides the room from the public lobby listing. No effect on rules.
    #[serde(default)]
    pub is_private: bool,
    /// Bumped by every accepted transition and clock tick.
    #[serde(default)]
    pub version: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::DEFAULT_CLOCK_SECS)
    }
}

impl GameState {
    /// An empty room with both clocks at `clock_secs`.
    pub fn new(clock_secs: u32) -> Self {
        Self {
            board: Board::new(),
            turn: 0,
            players: Vec::new(),
            clocks: [clock_secs; 2],
            outcome: None,
            rematch_offer: None,
            is_private: false,
            version: 0,
        }
    }

    /// The seat held by `handle`.
    pub fn seat_of(&self, handle: &Handle) -> Option<usize> {
        self.players.iter().position(|p| p == handle)
    }

    /// Returns `true` if `handle` holds a seat.
    pub fn is_player(&self, handle: &Handle) -> bool {
        self.seat_of(handle).is_some()
    }

    /// Returns `true` if `handle` is watching without a seat.
    pub fn is_observer(&self, handle: &Handle) -> bool {
        !self.is_player(handle)
    }

    /// The other seated player, if `handle` is seated and has one.
    pub fn opponent_of(&self, handle: &Handle) -> Option<&Handle> {
        self.seat_of(handle)?;
        self.players.iter().find(|p| *p != handle)
    }

    /// The handle whose turn it is, if that seat is filled.
    pub fn to_move(&self) -> Option<&Handle> {
        self.players.get(self.turn)
    }

    /// The mark of the active seat.
    pub fn active_mark(&self) -> Mark {
        Mark::for_index(self.turn)
    }

    /// Returns `true` once strictly more than one mark has been placed.
    pub fn has_started(&self) -> bool {
        self.board.marks_placed() > 1
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_rematch_offered(&self) -> bool {
        self.rematch_offer.is_some()
    }

    /// What a header line for this room would say.
    pub fn status(&self) -> GameStatus {
        if self.players.len() < 2 {
            return GameStatus::WaitingForOpponent;
        }
        match (&self.outcome, self.to_move()) {
            (Some(Outcome::Winner(winner)), _) => GameStatus::Won {
                winner: winner.clone(),
            },
            (Some(Outcome::Draw), _) => GameStatus::Draw,
            (None, Some(to_move)) => GameStatus::InProgress {
                to_move: to_move.clone(),
            },
            (None, None) => GameStatus::WaitingForOpponent,
        }
    }

    /// Checks the document against the rules every accepted transition
    /// preserves.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.players.len() > 2 {
            return Err(InvariantViolation::TooManyPlayers(self.players.len()));
        }
        if let [a, b] = self.players.as_slice() {
            if a == b {
                return Err(InvariantViolation::DuplicatePlayer(a.clone()));
            }
        }
        if self.turn > 1 {
            return Err(InvariantViolation::TurnOutOfRange(self.turn));
        }
        let marks = self.board.marks_placed();
        if self.turn != marks % 2 {
            return Err(InvariantViolation::TurnOutOfSync {
                turn: self.turn,
                marks,
            });
        }
        if self.outcome.is_none() {
            if let Some(seat) = self.clocks.iter().position(|c| *c == 0) {
                return Err(InvariantViolation::ClockExpiredWithoutOutcome { seat });
            }
            let decided = board::is_winning_line(&self.board, Mark::X)
                || board::is_winning_line(&self.board, Mark::O)
                || board::is_full(&self.board);
            if decided {
                return Err(InvariantViolation::MissingOutcome);
            }
        }
        Ok(())
    }
}

/// A summary of where a room stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStatus {
    WaitingForOpponent,
    InProgress { to_move: Handle },
    Won { winner: Handle },
    Draw,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForOpponent => write!(f, "Waiting for opponent to join..."),
            Self::InProgress { to_move } => write!(f, "Turn: {to_move}"),
            Self::Won { winner } => write!(f, "{winner} wins!"),
            Self::Draw => write!(f, "Draw!"),
        }
    }
}
