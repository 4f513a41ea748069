use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        phase::VisibleGamePhase,
        validation::{validate_catalog_id, validate_not_blank, validate_text_length},
    },
    state::{
        game::{Artist, Difficulty, Game, GameMode, GuessOutcome, ItemKind, TargetItem},
        hint::{HintLevel, credit_hint, render_hint},
        round::{RoundId, RoundTimer},
        state_machine::{GamePhase, LossReason},
    },
};

/// Query string of the artist search.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Free-text artist name.
    pub q: String,
}

impl Validate for SearchQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_not_blank(&self.q) {
            errors.add("q", e);
        } else if let Err(e) = validate_text_length(&self.q) {
            errors.add("q", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Start a game on an artist picked from the latest search.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartSpecificRequest {
    pub artist_id: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub timer_enabled: bool,
}

impl Validate for StartSpecificRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_catalog_id(&self.artist_id) {
            errors.add("artist_id", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Start a game where every round draws a random artist.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartRandomRequest {
    pub difficulty: Difficulty,
    #[serde(default)]
    pub timer_enabled: bool,
}

/// Guess for the running round. Blank guesses are accepted and ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GuessRequest {
    pub guess: String,
}

impl Validate for GuessRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_text_length(&self.guess) {
            errors.add("guess", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Leaving a game discards the session; the client has to confirm it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuitRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// Artist entry of a search response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArtistSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub genres: Vec<String>,
}

impl From<&Artist> for ArtistSummary {
    fn from(value: &Artist) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            image_url: value.image_url.clone(),
            genres: value.genres.clone(),
        }
    }
}

/// Artists matching a search.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub artists: Vec<ArtistSummary>,
}

/// What the client may know about the item being guessed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TargetView {
    /// Title, only once the round is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub artist_name: String,
    pub cover_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<u16>,
    pub external_url: String,
    pub kind: ItemKind,
}

impl TargetView {
    fn new(target: &TargetItem, reveal_name: bool) -> Self {
        Self {
            name: reveal_name.then(|| target.name.clone()),
            artist_name: target.artist_name.clone(),
            cover_url: target.cover_url.clone(),
            release_year: target.release_year(),
            external_url: target.external_url.clone(),
            kind: target.kind,
        }
    }
}

/// Countdown of a timed round.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct TimerView {
    pub remaining_seconds: u32,
    pub allotment_seconds: u32,
}

impl From<RoundTimer> for TimerView {
    fn from(value: RoundTimer) -> Self {
        Self {
            remaining_seconds: value.remaining_seconds,
            allotment_seconds: value.allotment_seconds,
        }
    }
}

/// Everything the presentation needs to render the game.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameView {
    pub phase: VisibleGamePhase,
    /// A round is being fetched from the catalog.
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<GameMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub round_id: Option<RoundId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetView>,
    pub guesses_used: u32,
    pub max_guesses: u32,
    /// Downsample factor for the cover; `1` means full fidelity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixelation: Option<u32>,
    pub hint_level: HintLevel,
    /// Masked title for the current hint level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_wrong_guess: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerView>,
    pub score: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_reason: Option<LossReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        let phase = game.phase();
        let settings = game.session().settings();
        let round = game.round();
        let playing = phase == GamePhase::Playing;
        let round_over = matches!(phase, GamePhase::Won | GamePhase::Lost(_));

        let hint_level = round.map(|round| round.hint()).unwrap_or_default();
        let hint = round
            .filter(|_| playing)
            .and_then(|round| render_hint(&round.target().name, hint_level));
        let credit = round
            .filter(|_| hint_level > HintLevel::None)
            .and_then(|round| credit_hint(&round.target().name));

        Self {
            phase: VisibleGamePhase::from(&phase),
            loading: game.is_loading(),
            mode: settings.map(|settings| settings.mode),
            difficulty: settings.map(|settings| settings.difficulty),
            artist_name: game.session().artist().map(|artist| artist.name.clone()),
            round_id: round.map(|round| round.id()),
            target: round.map(|round| TargetView::new(round.target(), round_over)),
            guesses_used: round.map(|round| round.guesses_used()).unwrap_or_default(),
            max_guesses: game.rules().max_guesses,
            pixelation: round.map(|round| round.pixelation()),
            hint_level,
            hint,
            credit_hint: credit,
            last_wrong_guess: round
                .and_then(|round| round.last_wrong_guess())
                .map(str::to_string),
            timer: round.and_then(|round| round.timer()).map(TimerView::from),
            score: game.score(),
            loss_reason: game.loss_reason(),
            notice: game.notice().map(str::to_string),
        }
    }
}

/// Outcome of a guess together with the resulting state.
#[derive(Debug, Serialize, ToSchema)]
pub struct GuessResponse {
    pub outcome: GuessOutcome,
    pub view: GameView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        game::{LoadOutcome, TargetItem},
        rules::GameRules,
    };

    fn artist() -> Artist {
        Artist {
            id: "beatles".into(),
            name: "The Beatles".into(),
            image_url: None,
            genres: vec!["rock".into()],
        }
    }

    fn target() -> TargetItem {
        TargetItem {
            id: "alb-1".into(),
            name: "Help! (Remastered)".into(),
            artist_name: "The Beatles".into(),
            cover_url: "https://img.example/help.jpg".into(),
            release_date: "1965-08-06".into(),
            external_url: "https://open.example/album/alb-1".into(),
            kind: ItemKind::Album,
        }
    }

    fn playing_game(score: u64) -> Game {
        let mut game = Game::new(GameRules::default(), score);
        game.set_search_results(vec![artist()]).unwrap();
        let ticket = game.begin_specific("beatles", Difficulty::Medium, true).unwrap();
        game.complete_load(
            &ticket,
            LoadOutcome::Loaded {
                artist: artist(),
                item: target(),
                pool_reset: false,
            },
        )
        .unwrap();
        game
    }

    #[test]
    fn title_is_hidden_while_playing() {
        let game = playing_game(0);
        let view = GameView::from(&game);
        assert_eq!(view.phase, VisibleGamePhase::Playing);
        let target = view.target.unwrap();
        assert_eq!(target.name, None);
        assert_eq!(target.release_year, Some(1965));
        assert_eq!(view.pixelation, Some(40));
        assert_eq!(view.timer.unwrap().remaining_seconds, 10);
        assert_eq!(view.hint, None);

        let json = serde_json::to_value(GameView::from(&game)).unwrap();
        assert!(!json.to_string().contains("Help!"));
    }

    #[test]
    fn hint_text_follows_level() {
        let mut game = playing_game(100);
        game.request_hint().unwrap();
        let view = GameView::from(&game);
        assert_eq!(view.hint_level, HintLevel::Masked);
        assert_eq!(view.hint.as_deref(), Some("____!"));
        assert_eq!(view.credit_hint, None);
    }

    #[test]
    fn title_is_revealed_once_lost() {
        let mut game = playing_game(100);
        game.skip().unwrap();
        let view = GameView::from(&game);
        assert_eq!(view.phase, VisibleGamePhase::Lost);
        assert_eq!(view.loss_reason, Some(LossReason::Skipped));
        assert_eq!(view.pixelation, Some(1));
        assert_eq!(view.target.unwrap().name.as_deref(), Some("Help! (Remastered)"));
        assert_eq!(view.hint, None);
        assert_eq!(view.score, 50);
    }

    #[test]
    fn requests_are_validated() {
        assert!(SearchQuery { q: "  ".into() }.validate().is_err());
        assert!(SearchQuery { q: "daft punk".into() }.validate().is_ok());
        assert!(
            StartSpecificRequest {
                artist_id: "bad id".into(),
                difficulty: Difficulty::Easy,
                timer_enabled: false,
            }
            .validate()
            .is_err()
        );
        assert!(GuessRequest { guess: "".into() }.validate().is_ok());
        assert!(GuessRequest { guess: "x".repeat(500) }.validate().is_err());
    }

    #[test]
    fn menu_view_is_empty() {
        let game = Game::new(GameRules::default(), 7);
        let view = GameView::from(&game);
        assert_eq!(view.phase, VisibleGamePhase::Menu);
        assert!(!view.loading);
        assert!(view.target.is_none());
        assert_eq!(view.max_guesses, 4);
        assert_eq!(view.score, 7);
    }
}
