//! Clock rules: per-tick decrements and timeout outcomes.

use litoe_game::{GameState, Outcome};
use litoe_protocol::Handle;
use tracing::info;

/// Stateless clock rules over a [`GameState`].
///
/// A tick takes one unit off the active seat's clock. If that empties the
/// clock, the opponent is declared the winner in the same returned
/// document, so no observer ever sees a zero clock without an outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnClock;

impl TurnClock {
    /// Returns `true` while clocks should run: two players seated and no
    /// outcome yet.
    pub fn is_running(state: &GameState) -> bool {
        state.players.len() == 2 && state.outcome.is_none()
    }

    /// Returns `true` if `handle` is the one client that should drive the
    /// tick for this room right now.
    pub fn holds_authority(state: &GameState, handle: &Handle) -> bool {
        Self::is_running(state) && state.to_move() == Some(handle)
    }

    /// Applies one tick. Returns `None` when the clock is not running, or
    /// when the document has no valid seat to charge.
    pub fn tick(state: &GameState) -> Option<GameState> {
        if !Self::is_running(state) {
            return None;
        }

        let loser = state.to_move()?;
        let winner = state.opponent_of(loser)?.clone();
        let mut next = state.clone();
        let clock = next.clocks.get_mut(state.turn)?;
        *clock = clock.saturating_sub(1);
        if *clock == 0 {
            info!(%loser, %winner, "clock ran out");
            next.outcome = Some(Outcome::Winner(winner));
        }
        next.version = next.version.wrapping_add(1);
        Some(next)
    }

    /// Applies up to `ticks` ticks, stopping early on timeout.
    ///
    /// Returns `None` if not even one tick applies.
    pub fn advance(state: &GameState, ticks: u32) -> Option<GameState> {
        if ticks == 0 {
            return None;
        }
        let mut current = Self::tick(state)?;
        for _ in 1..ticks {
            match Self::tick(&current) {
                Some(next) => current = next,
                None => break,
            }
        }
        Some(current)
    }
}
