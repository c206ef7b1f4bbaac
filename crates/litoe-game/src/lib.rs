//! Tic-tac-toe rules and the room state machine for Litoe.
//!
//! Everything here is pure: no I/O, no clocks, no locks. Clients run these
//! functions against the latest snapshot they have observed and publish
//! the result.
//!
//! # Key types
//!
//! - [`board`]: pure board functions (`apply_move`, `is_winning_line`, ...)
//! - [`GameState`]: the replicated room document
//! - [`GameStateMachine`]: validates [`Intent`]s and produces [`Transition`]s
//! - [`Rejection`]: why an intent was refused
//! - [`GameConfig`]: rule settings (clock length, surrogate moves)

pub mod board;
mod config;
mod error;
mod machine;
mod state;

pub use board::{Board, Position};
pub use config::GameConfig;
pub use error::{InvariantViolation, Rejection};
pub use machine::{GameStateMachine, Intent, ResetOptions, Transition};
pub use state::{GameState, GameStatus, Outcome};
