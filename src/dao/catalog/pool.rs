//! Which part of an artist's catalog each difficulty draws from.

use crate::state::game::Difficulty;

/// Albums/singles fetched for medium rounds.
pub const MEDIUM_DISCOGRAPHY_LIMIT: u32 = 20;
/// Albums/singles fetched for hard rounds.
pub const HARD_DISCOGRAPHY_LIMIT: u32 = 50;

/// Candidate pool a round's target is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatePool {
    /// The artist's most popular tracks; every item is a single.
    TopTracks,
    /// Albums and singles of the artist, newest first, up to `limit` entries.
    Discography {
        /// Maximum number of releases considered.
        limit: u32,
    },
}

impl CandidatePool {
    /// Single pool-selection policy shared by the first round and every following one.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => CandidatePool::TopTracks,
            Difficulty::Medium => CandidatePool::Discography {
                limit: MEDIUM_DISCOGRAPHY_LIMIT,
            },
            Difficulty::Hard => CandidatePool::Discography {
                limit: HARD_DISCOGRAPHY_LIMIT,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_grows_with_difficulty() {
        assert_eq!(
            CandidatePool::for_difficulty(Difficulty::Easy),
            CandidatePool::TopTracks
        );
        assert_eq!(
            CandidatePool::for_difficulty(Difficulty::Medium),
            CandidatePool::Discography { limit: 20 }
        );
        assert_eq!(
            CandidatePool::for_difficulty(Difficulty::Hard),
            CandidatePool::Discography { limit: 50 }
        );
    }
}
