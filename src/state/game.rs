//! The single game: session settings, exclusion sets, the running round and the XP ledger.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

use crate::state::{
    hint::HintLevel,
    normalize::is_correct_guess,
    round::{RoundId, RoundProgress},
    rules::GameRules,
    score::{ScoreLedger, win_award},
    state_machine::{GameEvent, GamePhase, GameStateMachine, LossReason, PlanError, PlanId},
};

/// How hard the round is: which catalog pool is drawn from, timer length and award multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Popular tracks only, long timer.
    Easy,
    /// Albums and singles.
    Medium,
    /// Deep discography, short timer.
    Hard,
}

/// How the artist of each round is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// The player picked an artist from a search and keeps playing it.
    Specific,
    /// A new random artist is drawn for every round.
    Random,
}

/// Release type of a guessable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Full-length album.
    Album,
    /// Single or individual track.
    Single,
    /// Compilation or best-of.
    Compilation,
}

/// Artist as returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Portrait, when the catalog has one.
    pub image_url: Option<String>,
    /// Genres tagged on the artist.
    pub genres: Vec<String>,
}

/// Item the player has to name during a round. Immutable once the round started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetItem {
    /// Catalog identifier, unique per item.
    pub id: String,
    /// Title to be guessed.
    pub name: String,
    /// Display artist name.
    pub artist_name: String,
    /// Cover art drawn pixelated.
    pub cover_url: String,
    /// Release date as given by the catalog (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
    pub release_date: String,
    /// Link to the item on the catalog's site.
    pub external_url: String,
    /// Release type.
    pub kind: ItemKind,
}

impl TargetItem {
    /// Year part of the release date, when it starts with four digits.
    pub fn release_year(&self) -> Option<u16> {
        self.release_date.get(..4).and_then(|year| year.parse().ok())
    }
}

/// Choices made when a play session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// How artists are chosen.
    pub mode: GameMode,
    /// Difficulty for every round of the session.
    pub difficulty: Difficulty,
    /// Whether rounds run against a countdown.
    pub timer_enabled: bool,
}

/// Key of an exclusion set: items already played for one artist at one difficulty.
pub type PoolKey = (String, Difficulty);

/// Session-wide data surviving from one round to the next.
#[derive(Debug, Clone, Default)]
pub struct PlaySession {
    settings: Option<SessionSettings>,
    artist: Option<Artist>,
    search_results: Vec<Artist>,
    played: IndexMap<PoolKey, IndexSet<String>>,
}

impl PlaySession {
    /// Mode, difficulty and timer choice of the running session.
    pub fn settings(&self) -> Option<SessionSettings> {
        self.settings
    }

    /// Artist of the current or last round.
    pub fn artist(&self) -> Option<&Artist> {
        self.artist.as_ref()
    }

    /// Result of the latest artist search.
    pub fn search_results(&self) -> &[Artist] {
        &self.search_results
    }

    /// Item ids already served for `artist_id` at `difficulty`, in play order.
    pub fn played(&self, artist_id: &str, difficulty: Difficulty) -> Option<&IndexSet<String>> {
        self.played.get(&(artist_id.to_string(), difficulty))
    }

    fn exclusion(&self, artist_id: &str, difficulty: Difficulty) -> HashSet<String> {
        self.played(artist_id, difficulty)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Work order handed to the service layer while a round is being fetched.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    /// Pending transition that the completion must match.
    pub plan_id: PlanId,
    /// Settings the new round will run with.
    pub settings: SessionSettings,
    /// Artist to draw from; `None` asks for a random artist.
    pub artist: Option<Artist>,
    /// Items that must not be served again.
    pub exclude: HashSet<String>,
    /// Whether the exclusion set is discarded once the round loads.
    pub reset_pool: bool,
}

/// What the catalog produced for a [`LoadTicket`].
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// A playable item was found.
    Loaded {
        /// Artist the item belongs to.
        artist: Artist,
        /// Item to guess.
        item: TargetItem,
        /// The exclusion set was ignored to find this item and must start over.
        pool_reset: bool,
    },
    /// Every item of the artist's pool has been played.
    Exhausted {
        /// Artist whose pool is exhausted.
        artist: Artist,
    },
    /// The catalog failed; the message is shown to the player.
    Failed(String),
}

/// Where a completed load left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    /// A round started.
    Started {
        /// New round identifier.
        round_id: RoundId,
        /// Countdown allotment when the timer is enabled.
        timer_seconds: Option<u32>,
    },
    /// The artist's pool is cleared.
    AllCleared,
    /// The game fell back to the menu.
    Failed,
}

/// Result of a guess submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GuessOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The guess was right.
    Won {
        /// XP credited for the win.
        award: u64,
    },
    /// The guess was wrong and the round goes on.
    Wrong {
        /// Wrong guesses still allowed.
        guesses_left: u32,
    },
    /// The guess was wrong and it was the last allowed one.
    OutOfGuesses,
}

/// Result of a hint request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintOutcome {
    /// The hint moved forward to this level.
    Advanced(HintLevel),
    /// The hint was already complete; nothing was charged.
    AlreadyComplete,
}

/// Result of a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to another round or the game is not running a timed round.
    Ignored,
    /// Seconds left after the tick.
    Running(u32),
    /// The countdown reached zero and the round is lost.
    TimeUp,
}

/// Errors raised by game actions. None of them change the state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The action is not allowed in the current phase.
    #[error("{action} is not allowed while in {phase:?}")]
    InvalidPhase {
        /// Action attempted.
        action: &'static str,
        /// Phase the game was in.
        phase: GamePhase,
    },
    /// A round is already being loaded.
    #[error("a round is already loading")]
    LoadPending,
    /// The completed load no longer matches the game (the player quit meanwhile).
    #[error("round load result is stale")]
    StaleLoad,
    /// The requested artist is not part of the latest search.
    #[error("artist `{0}` is not part of the search results")]
    UnknownArtist(String),
    /// The balance does not cover the cost of the action.
    #[error("not enough points: {required} required, {available} available")]
    InsufficientScore {
        /// Cost of the action.
        required: u64,
        /// Current balance.
        available: u64,
    },
}

/// Whole state of one player's game: phase, session, current round and XP.
///
/// Fields are private; every change goes through a transition method so the invariants (a
/// target exists only in `Playing`, `Won` or `Lost`; a loss reason only in `Lost`; XP never
/// negative) hold at this single boundary.
#[derive(Debug, Clone)]
pub struct Game {
    rules: GameRules,
    machine: GameStateMachine,
    session: PlaySession,
    round: Option<RoundProgress>,
    ledger: ScoreLedger,
    notice: Option<String>,
}

impl Game {
    /// Build a game in the menu with a previously persisted XP balance.
    pub fn new(rules: GameRules, score: u64) -> Self {
        Self {
            rules,
            machine: GameStateMachine::new(),
            session: PlaySession::default(),
            round: None,
            ledger: ScoreLedger::with_balance(score),
            notice: None,
        }
    }

    /// Rules the game runs with.
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    /// Version of the phase machine, bumped on every transition.
    pub fn version(&self) -> usize {
        self.machine.snapshot().version
    }

    /// Whether a round is being fetched.
    pub fn is_loading(&self) -> bool {
        self.machine.is_pending()
    }

    /// Session-wide data.
    pub fn session(&self) -> &PlaySession {
        &self.session
    }

    /// Current round, present in `Playing`, `Won` and `Lost`.
    pub fn round(&self) -> Option<&RoundProgress> {
        self.round.as_ref()
    }

    /// XP balance.
    pub fn score(&self) -> u64 {
        self.ledger.score()
    }

    /// Message left by the last failed load.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Loss reason, only while in `Lost`.
    pub fn loss_reason(&self) -> Option<LossReason> {
        match self.phase() {
            GamePhase::Lost(reason) => Some(reason),
            _ => None,
        }
    }

    /// Store the artists returned by a search so one can be picked.
    pub fn set_search_results(&mut self, artists: Vec<Artist>) -> Result<(), GameError> {
        self.require_phase("search", |phase| matches!(phase, GamePhase::Menu))?;
        self.session.search_results = artists;
        self.notice = None;
        Ok(())
    }

    /// Start loading a first round for an artist picked from the search results.
    pub fn begin_specific(
        &mut self,
        artist_id: &str,
        difficulty: Difficulty,
        timer_enabled: bool,
    ) -> Result<LoadTicket, GameError> {
        self.require_phase("starting a game", |phase| matches!(phase, GamePhase::Menu))?;
        let artist = self
            .session
            .search_results
            .iter()
            .find(|artist| artist.id == artist_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownArtist(artist_id.to_string()))?;

        let exclude = self.session.exclusion(&artist.id, difficulty);
        self.plan_load(
            SessionSettings {
                mode: GameMode::Specific,
                difficulty,
                timer_enabled,
            },
            Some(artist),
            exclude,
            false,
        )
    }

    /// Start loading a first round for an artist chosen by the catalog.
    pub fn begin_random(
        &mut self,
        difficulty: Difficulty,
        timer_enabled: bool,
    ) -> Result<LoadTicket, GameError> {
        self.require_phase("starting a game", |phase| matches!(phase, GamePhase::Menu))?;
        self.plan_load(
            SessionSettings {
                mode: GameMode::Random,
                difficulty,
                timer_enabled,
            },
            None,
            HashSet::new(),
            false,
        )
    }

    /// Start loading the round following a win or a loss.
    pub fn begin_next(&mut self) -> Result<LoadTicket, GameError> {
        self.require_phase("next round", |phase| {
            matches!(phase, GamePhase::Won | GamePhase::Lost(_))
        })?;
        let settings = self.current_settings("next round")?;

        match settings.mode {
            GameMode::Random => self.plan_load(settings, None, HashSet::new(), false),
            GameMode::Specific => {
                let artist = self.current_artist("next round")?;
                let exclude = self.session.exclusion(&artist.id, settings.difficulty);
                self.plan_load(settings, Some(artist), exclude, false)
            }
        }
    }

    /// Start over an artist whose pool was fully played.
    pub fn begin_replay(&mut self) -> Result<LoadTicket, GameError> {
        self.require_phase("replay", |phase| matches!(phase, GamePhase::AllCleared))?;
        let settings = self.current_settings("replay")?;
        let artist = self.current_artist("replay")?;
        self.plan_load(settings, Some(artist), HashSet::new(), true)
    }

    /// Apply what the catalog produced for `ticket`.
    ///
    /// Returns [`GameError::StaleLoad`] and leaves the game untouched when the ticket's plan is
    /// no longer pending, e.g. because the player quit while the request was in flight.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        outcome: LoadOutcome,
    ) -> Result<LoadResult, GameError> {
        match outcome {
            LoadOutcome::Loaded {
                artist,
                item,
                pool_reset,
            } => {
                self.machine
                    .apply(ticket.plan_id)
                    .map_err(|_| GameError::StaleLoad)?;

                let settings = ticket.settings;
                let played = self
                    .session
                    .played
                    .entry((artist.id.clone(), settings.difficulty))
                    .or_default();
                if pool_reset || ticket.reset_pool {
                    played.clear();
                }
                played.insert(item.id.clone());

                let timer_seconds = settings
                    .timer_enabled
                    .then(|| self.rules.timer_seconds(settings.difficulty));
                let round = RoundProgress::new(item, &self.rules, timer_seconds);
                let round_id = round.id();

                self.session.settings = Some(settings);
                self.session.artist = Some(artist);
                self.round = Some(round);
                self.notice = None;

                Ok(LoadResult::Started {
                    round_id,
                    timer_seconds,
                })
            }
            LoadOutcome::Exhausted { artist } => {
                self.machine
                    .abort(ticket.plan_id)
                    .map_err(|_| GameError::StaleLoad)?;
                self.machine
                    .fire(GameEvent::PoolExhausted)
                    .map_err(|err| plan_error("pool exhausted", err))?;

                self.session.settings = Some(ticket.settings);
                self.session.artist = Some(artist);
                self.round = None;
                Ok(LoadResult::AllCleared)
            }
            LoadOutcome::Failed(message) => {
                self.machine
                    .abort(ticket.plan_id)
                    .map_err(|_| GameError::StaleLoad)?;
                self.machine
                    .interrupt(GameEvent::LoadFailed)
                    .map_err(|invalid| GameError::InvalidPhase {
                        action: "load failure",
                        phase: invalid.from,
                    })?;

                self.session.settings = None;
                self.session.artist = None;
                self.round = None;
                self.notice = Some(message);
                Ok(LoadResult::Failed)
            }
        }
    }

    /// Evaluate a guess against the current target.
    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessOutcome, GameError> {
        self.require_phase("guessing", |phase| matches!(phase, GamePhase::Playing))?;
        if raw.trim().is_empty() {
            return Ok(GuessOutcome::Ignored);
        }

        let Some(round) = self.round.as_mut() else {
            return Err(GameError::InvalidPhase {
                action: "guessing",
                phase: self.machine.phase(),
            });
        };

        if is_correct_guess(raw, &round.target().name) {
            let difficulty = self
                .session
                .settings
                .map(|settings| settings.difficulty)
                .unwrap_or(Difficulty::Easy);
            let remaining = round.remaining_seconds().filter(|seconds| *seconds > 0);
            let award = win_award(&self.rules, difficulty, round.guesses_used(), remaining);

            round.reveal();
            self.ledger.award(award);
            self.machine
                .fire(GameEvent::CorrectGuess)
                .map_err(|err| plan_error("guessing", err))?;
            return Ok(GuessOutcome::Won { award });
        }

        if round.record_wrong_guess(raw, &self.rules) {
            round.reveal();
            self.machine
                .fire(GameEvent::RoundLost(LossReason::OutOfGuesses))
                .map_err(|err| plan_error("guessing", err))?;
            return Ok(GuessOutcome::OutOfGuesses);
        }

        Ok(GuessOutcome::Wrong {
            guesses_left: self.rules.max_guesses - round.guesses_used(),
        })
    }

    /// Buy the next hint level.
    pub fn request_hint(&mut self) -> Result<HintOutcome, GameError> {
        self.require_phase("hint", |phase| matches!(phase, GamePhase::Playing))?;
        let Some(round) = self.round.as_mut() else {
            return Err(GameError::InvalidPhase {
                action: "hint",
                phase: self.machine.phase(),
            });
        };

        if round.hint().next().is_none() {
            return Ok(HintOutcome::AlreadyComplete);
        }

        let cost = self.rules.hint_cost;
        if !self.ledger.spend(cost) {
            return Err(GameError::InsufficientScore {
                required: cost,
                available: self.ledger.score(),
            });
        }

        round.advance_hint();
        Ok(HintOutcome::Advanced(round.hint()))
    }

    /// Pay to give up the current round.
    pub fn skip(&mut self) -> Result<(), GameError> {
        self.require_phase("skip", |phase| matches!(phase, GamePhase::Playing))?;
        let cost = self.rules.skip_cost;
        if !self.ledger.spend(cost) {
            return Err(GameError::InsufficientScore {
                required: cost,
                available: self.ledger.score(),
            });
        }

        if let Some(round) = self.round.as_mut() {
            round.reveal();
        }
        self.machine
            .fire(GameEvent::RoundLost(LossReason::Skipped))
            .map_err(|err| plan_error("skip", err))?;
        Ok(())
    }

    /// One second of countdown for round `round_id`.
    pub fn tick(&mut self, round_id: RoundId) -> TickOutcome {
        if self.phase() != GamePhase::Playing {
            return TickOutcome::Ignored;
        }
        let Some(round) = self.round.as_mut().filter(|round| round.id() == round_id) else {
            debug!(%round_id, "ignoring tick for a round that is no longer current");
            return TickOutcome::Ignored;
        };

        match round.tick() {
            None => TickOutcome::Ignored,
            Some(0) => {
                round.reveal();
                if self
                    .machine
                    .fire(GameEvent::RoundLost(LossReason::TimeUp))
                    .is_err()
                {
                    return TickOutcome::Ignored;
                }
                TickOutcome::TimeUp
            }
            Some(remaining) => TickOutcome::Running(remaining),
        }
    }

    /// Leave the game for the menu, cancelling any in-flight load. XP is kept.
    pub fn quit(&mut self) -> Result<(), GameError> {
        self.machine
            .interrupt(GameEvent::Quit)
            .map_err(|invalid| GameError::InvalidPhase {
                action: "quit",
                phase: invalid.from,
            })?;

        self.session = PlaySession::default();
        self.round = None;
        self.notice = None;
        Ok(())
    }

    fn plan_load(
        &mut self,
        settings: SessionSettings,
        artist: Option<Artist>,
        exclude: HashSet<String>,
        reset_pool: bool,
    ) -> Result<LoadTicket, GameError> {
        let plan = self
            .machine
            .plan(GameEvent::RoundLoaded)
            .map_err(|err| plan_error("loading a round", err))?;

        Ok(LoadTicket {
            plan_id: plan.id,
            settings,
            artist,
            exclude,
            reset_pool,
        })
    }

    fn require_phase(
        &self,
        action: &'static str,
        allowed: impl Fn(GamePhase) -> bool,
    ) -> Result<(), GameError> {
        if self.machine.is_pending() {
            return Err(GameError::LoadPending);
        }
        let phase = self.machine.phase();
        if allowed(phase) {
            Ok(())
        } else {
            Err(GameError::InvalidPhase { action, phase })
        }
    }

    fn current_settings(&self, action: &'static str) -> Result<SessionSettings, GameError> {
        self.session.settings.ok_or(GameError::InvalidPhase {
            action,
            phase: self.machine.phase(),
        })
    }

    fn current_artist(&self, action: &'static str) -> Result<Artist, GameError> {
        self.session
            .artist
            .clone()
            .ok_or(GameError::InvalidPhase {
                action,
                phase: self.machine.phase(),
            })
    }
}

fn plan_error(action: &'static str, err: PlanError) -> GameError {
    match err {
        PlanError::AlreadyPending => GameError::LoadPending,
        PlanError::InvalidTransition(invalid) => GameError::InvalidPhase {
            action,
            phase: invalid.from,
        },
    }
}
