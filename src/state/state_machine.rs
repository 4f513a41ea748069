use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// High-level phases the game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No round is loaded; the player searches for an artist or asks for a random one.
    Menu,
    /// A round is running and accepts guesses, hints and skips.
    Playing,
    /// The last round was guessed correctly.
    Won,
    /// The last round ended without a correct guess.
    Lost(LossReason),
    /// Every item of the chosen artist's pool has been played.
    AllCleared,
}

/// Why a round ended without a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    /// The maximum number of wrong guesses was reached.
    OutOfGuesses,
    /// The countdown hit zero.
    TimeUp,
    /// The player paid to skip the round.
    Skipped,
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A new target item was fetched and the round starts.
    RoundLoaded,
    /// The player named the target.
    CorrectGuess,
    /// The round ended without a win.
    RoundLost(LossReason),
    /// The artist's pool has no unplayed item left.
    PoolExhausted,
    /// Fetching the next round failed; fall back to the menu.
    LoadFailed,
    /// The player confirmed leaving the current game.
    Quit,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: GamePhase,
    /// The event that cannot be applied from this phase.
    pub event: GameEvent,
}

/// Errors that can occur when planning a state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    /// The requested transition is not valid from the current phase.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// State machine phase changed since the plan was created.
    PhaseMismatch {
        /// Phase when plan was created.
        expected: GamePhase,
        /// Current phase.
        actual: GamePhase,
    },
    /// State machine version changed since the plan was created.
    VersionMismatch {
        /// Version when plan was created.
        expected: usize,
        /// Current version.
        actual: usize,
    },
}

/// Errors that can occur when aborting a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned state transition.
pub type PlanId = Uuid;

/// A planned state machine transition that has been validated but not yet applied.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Phase the state machine is currently in.
    pub from: GamePhase,
    /// Phase the state machine will transition to.
    pub to: GamePhase,
    /// Event that triggered this transition.
    pub event: GameEvent,
    /// Version number after applying this transition.
    pub version_next: usize,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: GamePhase,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
    /// Pending transition phase, if a transition is planned but not yet applied.
    pub pending: Option<GamePhase>,
}

/// Phase machine of a play session.
///
/// Asynchronous work (fetching the next round) is bracketed by [`plan`](Self::plan) and
/// [`apply`](Self::apply); the pending plan doubles as the loading flag. [`interrupt`](Self::interrupt)
/// lets a quit win against an in-flight plan, which then fails to apply.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    phase: GamePhase,
    version: usize,
    pending: Option<Plan>,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            phase: GamePhase::Menu,
            version: 0,
            pending: None,
        }
    }
}

impl GameStateMachine {
    /// Create a new state machine initialised in the menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Whether a planned transition is waiting to be applied or aborted.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.to),
        }
    }

    /// Plan a transition by validating that the event can be applied from the current phase.
    /// Returns a Plan that can later be applied or aborted.
    pub fn plan(&mut self, event: GameEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event)
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.phase,
            to: next,
            event,
            version_next: self.version + 1,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition, moving the state machine to the next phase.
    /// Returns the new phase after the transition.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<GamePhase, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected_plan_id = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected: expected_plan_id,
                got: plan_id,
            });
        }

        if self.phase != plan.from {
            return Err(ApplyError::PhaseMismatch {
                expected: plan.from,
                actual: self.phase,
            });
        }

        if self.version + 1 != plan.version_next {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.phase = plan.to;
        self.version = plan.version_next;

        Ok(self.phase)
    }

    /// Abort a planned transition without applying it, returning the state machine to its previous state.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    /// Plan and apply a transition in one step, for events that need no external work.
    pub fn fire(&mut self, event: GameEvent) -> Result<GamePhase, PlanError> {
        let plan = self.plan(event)?;
        self.apply(plan.id).map_err(|_| PlanError::AlreadyPending)
    }

    /// Apply `event` immediately, discarding whatever plan is pending.
    ///
    /// Used by quit and load failure, which must win over an in-flight load.
    pub fn interrupt(&mut self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.pending = None;
        self.phase = next;
        self.version += 1;
        Ok(self.phase)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (
                GamePhase::Menu | GamePhase::Won | GamePhase::Lost(_) | GamePhase::AllCleared,
                GameEvent::RoundLoaded,
            ) => GamePhase::Playing,
            (GamePhase::Playing, GameEvent::CorrectGuess) => GamePhase::Won,
            (GamePhase::Playing, GameEvent::RoundLost(reason)) => GamePhase::Lost(reason),
            (
                GamePhase::Menu | GamePhase::Won | GamePhase::Lost(_) | GamePhase::AllCleared,
                GameEvent::PoolExhausted,
            ) => GamePhase::AllCleared,
            (
                GamePhase::Menu | GamePhase::Won | GamePhase::Lost(_) | GamePhase::AllCleared,
                GameEvent::LoadFailed,
            ) => GamePhase::Menu,
            (GamePhase::Menu, GameEvent::Quit) if self.pending.is_some() => GamePhase::Menu,
            (
                GamePhase::Playing | GamePhase::Won | GamePhase::Lost(_) | GamePhase::AllCleared,
                GameEvent::Quit,
            ) => GamePhase::Menu,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
