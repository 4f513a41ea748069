//! Per-round progress: guesses, pixelation schedule, hint level and countdown.

use uuid::Uuid;

use crate::state::{game::TargetItem, hint::HintLevel, rules::GameRules};

/// Identifier of a single round, used to discard countdown ticks that outlive their round.
pub type RoundId = Uuid;

/// Countdown state of a timed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTimer {
    /// Seconds left before the round is lost.
    pub remaining_seconds: u32,
    /// Seconds granted at the start of the round and after each wrong guess.
    pub allotment_seconds: u32,
}

/// Progress of the round currently shown to the player.
#[derive(Debug, Clone)]
pub struct RoundProgress {
    id: RoundId,
    target: TargetItem,
    guesses_used: u32,
    pixelation: u32,
    last_wrong_guess: Option<String>,
    hint: HintLevel,
    timer: Option<RoundTimer>,
}

impl RoundProgress {
    /// Fresh progress for `target`; `timer_seconds` is `None` when the countdown is disabled.
    pub fn new(target: TargetItem, rules: &GameRules, timer_seconds: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            guesses_used: 0,
            pixelation: rules.starting_pixelation,
            last_wrong_guess: None,
            hint: HintLevel::None,
            timer: timer_seconds.map(|seconds| RoundTimer {
                remaining_seconds: seconds,
                allotment_seconds: seconds,
            }),
        }
    }

    /// Identifier of this round.
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// Item the player has to name.
    pub fn target(&self) -> &TargetItem {
        &self.target
    }

    /// Wrong guesses submitted so far.
    pub fn guesses_used(&self) -> u32 {
        self.guesses_used
    }

    /// Current pixelation factor; `1` means the cover is fully revealed.
    pub fn pixelation(&self) -> u32 {
        self.pixelation
    }

    /// Text of the most recent wrong guess.
    pub fn last_wrong_guess(&self) -> Option<&str> {
        self.last_wrong_guess.as_deref()
    }

    /// Hint level bought so far.
    pub fn hint(&self) -> HintLevel {
        self.hint
    }

    /// Countdown, when enabled for this round.
    pub fn timer(&self) -> Option<RoundTimer> {
        self.timer
    }

    /// Seconds left on the countdown, if enabled.
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.timer.map(|timer| timer.remaining_seconds)
    }

    /// Count a wrong guess. Returns `true` once the guess budget is spent.
    ///
    /// The countdown is refilled and the cover sharpens one step, except on the final guess where
    /// the caller reveals it entirely.
    pub fn record_wrong_guess(&mut self, guess: &str, rules: &GameRules) -> bool {
        self.guesses_used = (self.guesses_used + 1).min(rules.max_guesses);
        self.last_wrong_guess = Some(guess.trim().to_string());

        if self.guesses_used >= rules.max_guesses {
            return true;
        }

        self.pixelation = rules.next_pixelation(self.pixelation);
        if let Some(timer) = self.timer.as_mut() {
            timer.remaining_seconds = timer.allotment_seconds;
        }
        false
    }

    /// Show the cover at full fidelity; called when the round ends.
    pub fn reveal(&mut self) {
        self.pixelation = 1;
    }

    /// Move the hint one level forward. Returns `false` when already at the last level.
    pub fn advance_hint(&mut self) -> bool {
        match self.hint.next() {
            Some(next) => {
                self.hint = next;
                true
            }
            None => false,
        }
    }

    /// Take one second off the countdown and return what is left, or `None` without a timer.
    pub fn tick(&mut self) -> Option<u32> {
        let timer = self.timer.as_mut()?;
        timer.remaining_seconds = timer.remaining_seconds.saturating_sub(1);
        Some(timer.remaining_seconds)
    }
}
