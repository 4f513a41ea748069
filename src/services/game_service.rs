use std::{collections::HashSet, sync::Arc};

use tracing::{debug, info, warn};

use crate::{
    dto::{
        game::{GameView, GuessResponse, SearchResponse, StartRandomRequest, StartSpecificRequest},
        sse::NoticeKind,
    },
    error::ServiceError,
    services::sse_events::{broadcast_game_state, broadcast_notice, broadcast_timer_tick},
    state::{
        SharedState,
        game::{
            Artist, Game, GameError, GameMode, GuessOutcome, HintOutcome, LoadOutcome, LoadResult,
            LoadTicket, TargetItem, TickOutcome,
        },
        round::RoundId,
    },
};

/// Snapshot of the game for the presentation.
pub async fn current_view(state: &SharedState) -> GameView {
    let game = state.game().read().await;
    GameView::from(&*game)
}

/// Search the catalog for artists and keep the results for a later pick.
pub async fn search_artists(
    state: &SharedState,
    query: &str,
) -> Result<SearchResponse, ServiceError> {
    let query = query.trim().to_string();
    let artists: Vec<Artist> = state
        .catalog()
        .search_artists(query.clone())
        .await
        .inspect_err(|err| warn!(%query, error = %err, "artist search failed"))?
        .into_iter()
        .map(Artist::from)
        .collect();
    debug!(%query, found = artists.len(), "artist search completed");

    let view = {
        let mut game = state.game().write().await;
        game.set_search_results(artists.clone())?;
        GameView::from(&*game)
    };
    broadcast_game_state(state, &view);

    Ok(SearchResponse {
        artists: artists.iter().map(Into::into).collect(),
    })
}

/// Start a game on an artist from the latest search.
pub async fn start_specific(
    state: &SharedState,
    request: StartSpecificRequest,
) -> Result<GameView, ServiceError> {
    let ticket = begin(state, |game| {
        game.begin_specific(&request.artist_id, request.difficulty, request.timer_enabled)
    })
    .await?;
    load_round(state, ticket).await
}

/// Start a game drawing a random artist for every round.
pub async fn start_random(
    state: &SharedState,
    request: StartRandomRequest,
) -> Result<GameView, ServiceError> {
    let ticket = begin(state, |game| {
        game.begin_random(request.difficulty, request.timer_enabled)
    })
    .await?;
    load_round(state, ticket).await
}

/// Load the round following a win or a loss.
pub async fn next_round(state: &SharedState) -> Result<GameView, ServiceError> {
    let ticket = begin(state, Game::begin_next).await?;
    load_round(state, ticket).await
}

/// Play an exhausted artist again from a fresh pool.
pub async fn replay_artist(state: &SharedState) -> Result<GameView, ServiceError> {
    let ticket = begin(state, Game::begin_replay).await?;
    load_round(state, ticket).await
}

/// Evaluate a guess for the running round.
pub async fn submit_guess(state: &SharedState, guess: &str) -> Result<GuessResponse, ServiceError> {
    let (outcome, view) = {
        let mut game = state.game().write().await;
        let outcome = game.submit_guess(guess)?;
        match outcome {
            GuessOutcome::Wrong { .. } => {
                if let Some(round) = game.round().filter(|round| round.timer().is_some()) {
                    start_countdown(state, round.id());
                }
            }
            GuessOutcome::Won { .. } | GuessOutcome::OutOfGuesses => state.countdown().stop(),
            GuessOutcome::Ignored => {}
        }
        (outcome, GameView::from(&*game))
    };

    match outcome {
        GuessOutcome::Ignored => return Ok(GuessResponse { outcome, view }),
        GuessOutcome::Won { award } => {
            info!(award, score = view.score, "round won");
            persist_score(state).await;
        }
        GuessOutcome::Wrong { guesses_left } => {
            debug!(guesses_left, "wrong guess");
        }
        GuessOutcome::OutOfGuesses => info!("round lost: out of guesses"),
    }

    broadcast_game_state(state, &view);
    Ok(GuessResponse { outcome, view })
}

/// Buy the next hint level.
pub async fn request_hint(state: &SharedState) -> Result<GameView, ServiceError> {
    let result = {
        let mut game = state.game().write().await;
        game.request_hint().map(|outcome| (outcome, GameView::from(&*game)))
    };
    let (outcome, view) = notify_refusal(state, result)?;

    match outcome {
        HintOutcome::Advanced(level) => {
            info!(?level, score = view.score, "hint bought");
            persist_score(state).await;
            broadcast_game_state(state, &view);
        }
        HintOutcome::AlreadyComplete => debug!("hint already complete"),
    }
    Ok(view)
}

/// Pay to give up the running round.
pub async fn skip_round(state: &SharedState) -> Result<GameView, ServiceError> {
    let result = {
        let mut game = state.game().write().await;
        game.skip().map(|()| {
            state.countdown().stop();
            GameView::from(&*game)
        })
    };
    let view = notify_refusal(state, result)?;

    info!(score = view.score, "round skipped");
    persist_score(state).await;
    broadcast_game_state(state, &view);
    Ok(view)
}

/// Go back to the menu, cancelling any round in flight. `confirm` must be set.
pub async fn quit_game(state: &SharedState, confirm: bool) -> Result<GameView, ServiceError> {
    if !confirm {
        return Err(ServiceError::InvalidInput(
            "quitting discards the session and must be confirmed".into(),
        ));
    }

    let view = {
        let mut game = state.game().write().await;
        game.quit()?;
        state.countdown().stop();
        GameView::from(&*game)
    };

    info!(score = view.score, "game quit");
    broadcast_game_state(state, &view);
    Ok(view)
}

/// One countdown second for `round_id`. Returns whether the countdown should keep running.
pub async fn tick(state: &SharedState, round_id: RoundId) -> bool {
    let (outcome, view) = {
        let mut game = state.game().write().await;
        let outcome = game.tick(round_id);
        let view = matches!(outcome, TickOutcome::TimeUp).then(|| GameView::from(&*game));
        (outcome, view)
    };

    match outcome {
        TickOutcome::Ignored => false,
        TickOutcome::Running(remaining) => {
            broadcast_timer_tick(state, round_id, remaining);
            true
        }
        TickOutcome::TimeUp => {
            info!(%round_id, "round lost: time is up");
            broadcast_timer_tick(state, round_id, 0);
            if let Some(view) = view {
                broadcast_game_state(state, &view);
            }
            false
        }
    }
}

/// Plan a load under the write lock and let subscribers show the loading state.
async fn begin<F>(state: &SharedState, plan: F) -> Result<LoadTicket, ServiceError>
where
    F: FnOnce(&mut Game) -> Result<LoadTicket, GameError>,
{
    let (ticket, view) = {
        let mut game = state.game().write().await;
        let ticket = plan(&mut *game)?;
        state.countdown().stop();
        (ticket, GameView::from(&*game))
    };
    broadcast_game_state(state, &view);
    Ok(ticket)
}

/// Fetch a round for `ticket` without holding the game lock, then apply the result.
async fn load_round(state: &SharedState, ticket: LoadTicket) -> Result<GameView, ServiceError> {
    let outcome = fetch_round(state, &ticket).await;

    let (result, view) = {
        let mut game = state.game().write().await;
        let result = game.complete_load(&ticket, outcome);
        if let Ok(LoadResult::Started {
            round_id,
            timer_seconds: Some(_),
        }) = result
        {
            start_countdown(state, round_id);
        }
        (result, GameView::from(&*game))
    };

    match result {
        Ok(LoadResult::Started { round_id, .. }) => {
            info!(
                %round_id,
                artist = view.artist_name.as_deref().unwrap_or_default(),
                difficulty = ?view.difficulty,
                "round loaded"
            );
        }
        Ok(LoadResult::AllCleared) => {
            info!(
                artist = view.artist_name.as_deref().unwrap_or_default(),
                "artist pool cleared"
            );
            broadcast_notice(
                state,
                NoticeKind::AllCleared,
                "every release of this artist has been played",
            );
        }
        Ok(LoadResult::Failed) => {
            let message = view.notice.clone().unwrap_or_default();
            warn!(%message, "round load failed");
            broadcast_notice(state, NoticeKind::LoadFailed, message.clone());
            broadcast_game_state(state, &view);
            return Err(ServiceError::RoundLoadFailed(message));
        }
        Err(GameError::StaleLoad) => {
            debug!("discarding a round that finished loading after the game was left");
            return Err(ServiceError::InvalidState(
                "the game was left while the round was loading".into(),
            ));
        }
        Err(err) => return Err(err.into()),
    }

    broadcast_game_state(state, &view);
    Ok(view)
}

/// Ask the catalog for a playable item, resolving the artist first in random mode.
///
/// In random mode an exhausted pool is reset and asked once more; in specific mode it is
/// reported so the game can offer a replay.
async fn fetch_round(state: &SharedState, ticket: &LoadTicket) -> LoadOutcome {
    let difficulty = ticket.settings.difficulty;
    let (artist, exclude) = match &ticket.artist {
        Some(artist) => (artist.clone(), ticket.exclude.clone()),
        None => match pick_random_artist(state).await {
            Ok(artist) => {
                let exclude = state
                    .game()
                    .read()
                    .await
                    .session()
                    .played(&artist.id, difficulty)
                    .map(|played| played.iter().cloned().collect())
                    .unwrap_or_default();
                (artist, exclude)
            }
            Err(err) => return LoadOutcome::Failed(err.to_string()),
        },
    };

    let catalog = state.catalog();
    let had_exclusions = !exclude.is_empty();
    let (item, pool_reset) = match catalog
        .random_item_for_artist(artist.id.clone(), difficulty, exclude)
        .await
    {
        Ok(Some(item)) => (item, false),
        Ok(None) if !had_exclusions => {
            return LoadOutcome::Failed(format!("{} has no playable release", artist.name));
        }
        Ok(None) => match ticket.settings.mode {
            GameMode::Specific => return LoadOutcome::Exhausted { artist },
            GameMode::Random => {
                debug!(artist = %artist.name, "random artist pool exhausted; starting over");
                match catalog
                    .random_item_for_artist(artist.id.clone(), difficulty, HashSet::new())
                    .await
                {
                    Ok(Some(item)) => (item, true),
                    Ok(None) => {
                        return LoadOutcome::Failed(format!(
                            "{} has no playable release",
                            artist.name
                        ));
                    }
                    Err(err) => return LoadOutcome::Failed(err.to_string()),
                }
            }
        },
        Err(err) => return LoadOutcome::Failed(err.to_string()),
    };

    match TargetItem::try_from(item) {
        Ok(item) => LoadOutcome::Loaded {
            artist,
            item,
            pool_reset,
        },
        Err(err) => LoadOutcome::Failed(err.to_string()),
    }
}

/// Random artist for a round: the catalog's suggestion, or the configured fallback name.
async fn pick_random_artist(state: &SharedState) -> Result<Artist, ServiceError> {
    let catalog = state.catalog();
    let name = match catalog.random_artist_name().await {
        Ok(Some(name)) if !name.trim().is_empty() => name,
        Ok(_) => state.config().fallback_artist().to_string(),
        Err(err) => {
            warn!(error = %err, "random artist lookup failed; using the fallback artist");
            state.config().fallback_artist().to_string()
        }
    };

    catalog
        .search_artists(name.clone())
        .await?
        .into_iter()
        .next()
        .map(Artist::from)
        .ok_or(ServiceError::NoArtistsFound(name))
}

/// (Re)start the countdown of `round_id`. The task only keeps a weak handle on the state.
fn start_countdown(state: &SharedState, round_id: RoundId) {
    let weak = Arc::downgrade(state);
    state.countdown().start(round_id, move |round_id| {
        let weak = weak.clone();
        async move {
            match weak.upgrade() {
                Some(state) => tick(&state, round_id).await,
                None => false,
            }
        }
    });
}

/// Save the current balance; a failure only flips the degraded flag.
///
/// The balance is read after taking the save lock, so the last save to complete always carries
/// the newest value even when requests finish out of order.
async fn persist_score(state: &SharedState) {
    let _writing = state.score_writes().lock().await;
    let score = state.game().read().await.score();
    match state.score_store().save(score).await {
        Ok(()) => state.set_degraded(false),
        Err(err) => {
            warn!(score, error = %err, "failed to persist score");
            state.set_degraded(true);
        }
    }
}

/// Turn a refused purchase into a player notice before reporting the error.
fn notify_refusal<T>(state: &SharedState, result: Result<T, GameError>) -> Result<T, ServiceError> {
    result.map_err(|err| {
        if let GameError::InsufficientScore {
            required,
            available,
        } = err
        {
            broadcast_notice(
                state,
                NoticeKind::InsufficientScore,
                format!("{required} XP needed, you have {available}"),
            );
        }
        err.into()
    })
}
