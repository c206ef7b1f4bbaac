//! Turn clocks for Litoe.
//!
//! Two halves:
//!
//! - [`TurnClock`]: pure rules: decrement the active seat's clock and turn
//!   a timeout into an outcome in one step.
//! - [`ClockTimer`]: the cancellable, fixed-period timer a client uses to
//!   drive [`TurnClock::tick`] while it holds turn authority.
//!
//! Only the client of the player whose turn it is runs the timer. Other
//! observers never tick the same clock.

mod timer;
mod turn_clock;

pub use timer::{ClockConfig, ClockTick, ClockTimer};
pub use turn_clock::TurnClock;
