//! Tunable constants of the game economy and pacing.

use serde::Deserialize;

use crate::state::game::Difficulty;

/// Numbers driving guesses, pixelation, timer and the XP economy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Wrong guesses allowed before the round is lost.
    pub max_guesses: u32,
    /// Pixelation factor at the start of a round.
    pub starting_pixelation: u32,
    /// Added to `starting_pixelation / max_guesses` to get the per-guess decay.
    pub pixelation_step_bonus: u32,
    /// Lowest factor reachable through wrong guesses alone.
    pub min_pixelation: u32,
    /// XP cost of advancing the hint level by one step.
    pub hint_cost: u64,
    /// XP cost of skipping a round.
    pub skip_cost: u64,
    /// Award for a first-try win before the difficulty multiplier.
    pub base_award: u64,
    /// Award lost per wrong guess.
    pub award_step: u64,
    /// Award floor regardless of guesses used.
    pub min_award: u64,
    /// Bonus per remaining timer second on a win.
    pub time_bonus_per_second: u64,
    /// Countdown allotment on easy difficulty.
    pub easy_timer_seconds: u32,
    /// Countdown allotment on medium difficulty.
    pub medium_timer_seconds: u32,
    /// Countdown allotment on hard difficulty.
    pub hard_timer_seconds: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_guesses: 4,
            starting_pixelation: 40,
            pixelation_step_bonus: 2,
            min_pixelation: 2,
            hint_cost: 30,
            skip_cost: 50,
            base_award: 1000,
            award_step: 250,
            min_award: 100,
            time_bonus_per_second: 10,
            easy_timer_seconds: 15,
            medium_timer_seconds: 10,
            hard_timer_seconds: 5,
        }
    }
}

impl GameRules {
    /// Countdown allotment for `difficulty`, in seconds.
    pub fn timer_seconds(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy_timer_seconds,
            Difficulty::Medium => self.medium_timer_seconds,
            Difficulty::Hard => self.hard_timer_seconds,
        }
    }

    /// Pixelation removed by each wrong guess.
    pub fn pixelation_step(&self) -> u32 {
        self.starting_pixelation / self.max_guesses.max(1) + self.pixelation_step_bonus
    }

    /// Pixelation after one more wrong guess, never below the visibility floor.
    pub fn next_pixelation(&self, current: u32) -> u32 {
        current
            .saturating_sub(self.pixelation_step())
            .max(self.min_pixelation.max(2))
            .min(current)
    }

    /// Sanitize values a config file could have set out of range.
    pub fn normalized(mut self) -> Self {
        self.max_guesses = self.max_guesses.max(1);
        self.min_pixelation = self.min_pixelation.max(2);
        self.starting_pixelation = self.starting_pixelation.max(self.min_pixelation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_decays_to_floor() {
        let rules = GameRules::default();
        assert_eq!(rules.pixelation_step(), 12);
        assert_eq!(rules.next_pixelation(40), 28);
        assert_eq!(rules.next_pixelation(28), 16);
        assert_eq!(rules.next_pixelation(16), 4);
        assert_eq!(rules.next_pixelation(4), 2);
        assert_eq!(rules.next_pixelation(2), 2);
    }

    #[test]
    fn schedule_never_increases() {
        let rules = GameRules {
            min_pixelation: 10,
            ..GameRules::default()
        };
        assert_eq!(rules.next_pixelation(6), 6);
    }

    #[test]
    fn timer_allotment_per_difficulty() {
        let rules = GameRules::default();
        assert_eq!(rules.timer_seconds(Difficulty::Easy), 15);
        assert_eq!(rules.timer_seconds(Difficulty::Medium), 10);
        assert_eq!(rules.timer_seconds(Difficulty::Hard), 5);
    }

    #[test]
    fn normalized_repairs_degenerate_values() {
        let rules = GameRules {
            max_guesses: 0,
            min_pixelation: 0,
            starting_pixelation: 1,
            ..GameRules::default()
        }
        .normalized();
        assert_eq!(rules.max_guesses, 1);
        assert_eq!(rules.min_pixelation, 2);
        assert_eq!(rules.starting_pixelation, 2);
    }
}
