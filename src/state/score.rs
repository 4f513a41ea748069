//! XP ledger and the win award formula.

use crate::state::{game::Difficulty, rules::GameRules};

/// Running XP balance. Only awards and successful spends change it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    score: u64,
}

impl ScoreLedger {
    /// Start a ledger from a previously persisted balance.
    pub fn with_balance(score: u64) -> Self {
        Self { score }
    }

    /// Current balance.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Credit `amount` XP.
    pub fn award(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }

    /// Debit `amount` XP if the balance covers it. Returns whether the debit happened.
    pub fn spend(&mut self, amount: u64) -> bool {
        match self.score.checked_sub(amount) {
            Some(rest) => {
                self.score = rest;
                true
            }
            None => false,
        }
    }
}

/// Multiplier applied to every award earned at `difficulty`.
pub fn difficulty_multiplier(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 1.0,
        Difficulty::Medium => 1.5,
        Difficulty::Hard => 2.0,
    }
}

/// XP earned by a win after `guesses_used` wrong guesses.
///
/// `remaining_seconds` is only given when the countdown is enabled; any time left then adds a
/// flat bonus on top of the difficulty-scaled base.
pub fn win_award(
    rules: &GameRules,
    difficulty: Difficulty,
    guesses_used: u32,
    remaining_seconds: Option<u32>,
) -> u64 {
    let base = rules
        .base_award
        .saturating_sub(rules.award_step.saturating_mul(u64::from(guesses_used)))
        .max(rules.min_award);
    let time_bonus = remaining_seconds
        .map(|seconds| u64::from(seconds) * rules.time_bonus_per_second)
        .unwrap_or_default();

    let scaled = (base as f64 * difficulty_multiplier(difficulty)).floor() as u64;
    scaled.saturating_add(time_bonus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_never_drives_balance_negative() {
        for (score, amount) in [(0, 0), (0, 1), (40, 50), (50, 50), (120, 30), (5, u64::MAX)] {
            let mut ledger = ScoreLedger::with_balance(score);
            let spent = ledger.spend(amount);
            if score >= amount {
                assert!(spent);
                assert_eq!(ledger.score(), score - amount);
            } else {
                assert!(!spent);
                assert_eq!(ledger.score(), score);
            }
        }
    }

    #[test]
    fn award_saturates() {
        let mut ledger = ScoreLedger::with_balance(u64::MAX - 1);
        ledger.award(10);
        assert_eq!(ledger.score(), u64::MAX);
    }

    #[test]
    fn first_try_medium_award() {
        let rules = GameRules::default();
        assert_eq!(win_award(&rules, Difficulty::Medium, 0, None), 1500);
    }

    #[test]
    fn award_decreases_with_guesses_down_to_floor() {
        let rules = GameRules::default();
        let awards: Vec<u64> = (0..6)
            .map(|used| win_award(&rules, Difficulty::Easy, used, None))
            .collect();
        assert_eq!(awards, vec![1000, 750, 500, 250, 100, 100]);
    }

    #[test]
    fn remaining_time_adds_unscaled_bonus() {
        let rules = GameRules::default();
        assert_eq!(win_award(&rules, Difficulty::Hard, 1, Some(3)), 750 * 2 + 30);
        assert_eq!(win_award(&rules, Difficulty::Hard, 1, Some(0)), 1500);
        assert_eq!(win_award(&rules, Difficulty::Medium, 3, Some(5)), 375 + 50);
    }
}
