//! The transition state machine.
//!
//! Every intent a client can issue is validated against a freshly observed
//! [`GameState`] and either produces a complete replacement document or a
//! [`Rejection`]. The input is only ever borrowed, so a rejected intent
//! cannot leave a half-applied state behind.
//!
//! Because every client runs this independently and publishes whole
//! documents, two clients racing on the same snapshot end with one
//! accepted write and one dropped write, never a merged board.

use litoe_protocol::Handle;
use serde::{Deserialize, Serialize};

use crate::board::{self, Position};
use crate::{GameConfig, GameState, InvariantViolation, Outcome, Rejection};

/// What a client wants to do, independent of who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Intent {
    Join,
    Move { position: Position },
    Leave,
    Forfeit,
    /// Offers a rematch, or accepts one when an offer targets the actor.
    OfferRematch,
    AcceptRematch,
    Reset { reverse_players: bool },
    /// Always rejected when submitted by a client. Rooms are deleted by the
    /// last player leaving or by the lobby's admin operations.
    DeleteRoom,
}

/// Options for [`GameStateMachine::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetOptions {
    /// Swap seats, so the previous `O` player opens as `X`.
    pub reverse_players: bool,
}

/// The result of an accepted intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Publish this document as the room's new state.
    Update(GameState),
    /// Delete the room.
    DeleteRoom,
}

impl Transition {
    /// The new document, unless the room is being deleted.
    pub fn state(&self) -> Option<&GameState> {
        match self {
            Self::Update(s) => Some(s),
            Self::DeleteRoom => None,
        }
    }

    pub fn into_state(self) -> Option<GameState> {
        match self {
            Self::Update(s) => Some(s),
            Self::DeleteRoom => None,
        }
    }
}

/// Validates and applies intents against room documents.
#[derive(Debug, Clone, Default)]
pub struct GameStateMachine {
    config: GameConfig,
}

impl GameStateMachine {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// A fresh, empty room document.
    pub fn initial_state(&self, is_private: bool) -> GameState {
        GameState {
            is_private,
            ..GameState::new(self.config.clock_secs)
        }
    }

    /// Dispatches `intent` on behalf of `actor`.
    ///
    /// The observed document is checked first; a document that breaks an
    /// invariant yields [`Rejection::InvalidDocument`] for every intent.
    pub fn apply(
        &self,
        state: &GameState,
        actor: &Handle,
        intent: Intent,
    ) -> Result<Transition, Rejection> {
        state.check_invariants()?;
        match intent {
            Intent::Join => self.join(state, actor).map(Transition::Update),
            Intent::Move { position } => {
                self.make_move(state, position, actor).map(Transition::Update)
            }
            Intent::Leave => self.leave(state, actor),
            Intent::Forfeit => self.forfeit(state, actor).map(Transition::Update),
            Intent::OfferRematch => self.offer_rematch(state, actor).map(Transition::Update),
            Intent::AcceptRematch => self.accept_rematch(state, actor).map(Transition::Update),
            Intent::Reset { reverse_players } => self
                .player_reset(state, actor, ResetOptions { reverse_players })
                .map(Transition::Update),
            Intent::DeleteRoom => Err(Rejection::NotPermitted),
        }
    }

    /// Seats `handle` in the next free seat.
    ///
    /// `AlreadyJoined` and `RoomFull` are the idempotent-join cases: the
    /// caller skips them silently and keeps watching as before.
    pub fn join(&self, state: &GameState, handle: &Handle) -> Result<GameState, Rejection> {
        if state.is_player(handle) {
            return Err(Rejection::AlreadyJoined(handle.clone()));
        }
        if state.players.len() >= 2 {
            return Err(Rejection::RoomFull);
        }
        let mut next = state.clone();
        next.players.push(handle.clone());
        Ok(bump(next))
    }

    /// Places the active seat's mark at `position`.
    ///
    /// With `allow_surrogate_moves` the turn-authority check is skipped,
    /// but the actor must still be seated. The mark and the credited
    /// winner always follow the active seat, never the surrogate.
    pub fn make_move(
        &self,
        state: &GameState,
        position: Position,
        actor: &Handle,
    ) -> Result<GameState, Rejection> {
        if state.players.len() < 2 {
            return Err(Rejection::WaitingForOpponent);
        }
        if state.is_over() {
            return Err(Rejection::GameOver);
        }
        if !state.board.is_empty_at(position) {
            return Err(Rejection::CellOccupied(position));
        }
        let mover = state
            .to_move()
            .ok_or(Rejection::InvalidDocument(InvariantViolation::TurnOutOfRange(
                state.turn,
            )))?;
        if mover != actor {
            if !self.config.allow_surrogate_moves {
                return Err(Rejection::NotYourTurn {
                    expected: mover.clone(),
                    actual: actor.clone(),
                });
            }
            if !state.is_player(actor) {
                return Err(Rejection::NotAPlayer(actor.clone()));
            }
        }

        let mark = state.active_mark();
        let mut next = state.clone();
        next.board = board::apply_move(&state.board, position, mark);
        next.turn = 1 - state.turn;
        next.outcome = board::compute_outcome(&next.board, mark, mover);
        Ok(bump(next))
    }

    /// Removes `handle` from the room.
    ///
    /// The last player leaving deletes the room. Otherwise the leaver loses
    /// their seat and everything else stays, possibly a half-played board
    /// that the remaining player can reset.
    pub fn leave(&self, state: &GameState, handle: &Handle) -> Result<Transition, Rejection> {
        let seat = state
            .seat_of(handle)
            .ok_or_else(|| Rejection::NotAPlayer(handle.clone()))?;
        if state.players.len() == 1 {
            return Ok(Transition::DeleteRoom);
        }
        let mut next = state.clone();
        next.players.remove(seat);
        Ok(Transition::Update(bump(next)))
    }

    /// Concedes the game to the actor's opponent.
    pub fn forfeit(&self, state: &GameState, actor: &Handle) -> Result<GameState, Rejection> {
        if !state.has_started() {
            return Err(Rejection::GameNotStarted);
        }
        if state.is_over() {
            return Err(Rejection::GameOver);
        }
        let winner = opponent(state, actor)?;
        let mut next = state.clone();
        next.outcome = Some(Outcome::Winner(winner));
        Ok(bump(next))
    }

    /// Offers a rematch to the actor's opponent once the game has ended.
    ///
    /// This intent does double duty: when an offer already targets the
    /// actor, it is the acceptance and resets the game with seats swapped.
    /// The offering player repeating the offer is rejected, so an offer is
    /// only ever cleared by a reset.
    pub fn offer_rematch(
        &self,
        state: &GameState,
        actor: &Handle,
    ) -> Result<GameState, Rejection> {
        match &state.rematch_offer {
            Some(target) if target == actor => self.accept_rematch(state, actor),
            Some(_) if !state.is_player(actor) => Err(Rejection::NotAPlayer(actor.clone())),
            Some(target) => Err(Rejection::RematchPending {
                target: target.clone(),
            }),
            None => {
                let target = opponent(state, actor)?;
                if !state.is_over() {
                    return Err(Rejection::GameInProgress);
                }
                let mut next = state.clone();
                next.rematch_offer = Some(target);
                Ok(bump(next))
            }
        }
    }

    /// Accepts a pending rematch offer addressed to the actor.
    pub fn accept_rematch(
        &self,
        state: &GameState,
        actor: &Handle,
    ) -> Result<GameState, Rejection> {
        match &state.rematch_offer {
            None => Err(Rejection::NoRematchOffer),
            Some(target) if target != actor => {
                if state.is_player(actor) {
                    Err(Rejection::RematchPending {
                        target: target.clone(),
                    })
                } else {
                    Err(Rejection::NotAPlayer(actor.clone()))
                }
            }
            Some(_) => Ok(self.reset(
                state,
                ResetOptions {
                    reverse_players: true,
                },
            )),
        }
    }

    /// [`reset`](Self::reset) on behalf of a seated player.
    pub fn player_reset(
        &self,
        state: &GameState,
        actor: &Handle,
        options: ResetOptions,
    ) -> Result<GameState, Rejection> {
        if !state.is_player(actor) {
            return Err(Rejection::NotAPlayer(actor.clone()));
        }
        Ok(self.reset(state, options))
    }

    /// Starts a fresh game in the same room, keeping the seated players.
    ///
    /// Unchecked: callers decide who may reset.
    pub fn reset(&self, state: &GameState, options: ResetOptions) -> GameState {
        let mut players = state.players.clone();
        if options.reverse_players {
            players.reverse();
        }
        bump(GameState {
            players,
            is_private: state.is_private,
            version: state.version,
            ..GameState::new(self.config.clock_secs)
        })
    }

    /// Ends the room. Unchecked; only reachable through admin operations.
    pub fn delete_room(&self, _state: &GameState) -> Transition {
        Transition::DeleteRoom
    }
}

/// The actor's opponent, rejecting observers and empty seats.
fn opponent(state: &GameState, actor: &Handle) -> Result<Handle, Rejection> {
    if !state.is_player(actor) {
        return Err(Rejection::NotAPlayer(actor.clone()));
    }
    state
        .opponent_of(actor)
        .cloned()
        .ok_or(Rejection::WaitingForOpponent)
}

fn bump(mut state: GameState) -> GameState {
    state.version = state.version.wrapping_add(1);
    state
}
