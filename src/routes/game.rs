use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::game::{
        GameView, GuessRequest, GuessResponse, QuitRequest, SearchQuery, SearchResponse,
        StartRandomRequest, StartSpecificRequest,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes driving the game: search, start, round actions and quit.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/game", get(get_game))
        .route("/artists/search", get(search_artists))
        .route("/game/specific", post(start_specific))
        .route("/game/random", post(start_random))
        .route("/game/guess", post(submit_guess))
        .route("/game/hint", post(request_hint))
        .route("/game/skip", post(skip_round))
        .route("/game/next", post(next_round))
        .route("/game/replay", post(replay_artist))
        .route("/game/quit", post(quit_game))
}

/// Current state of the game.
#[utoipa::path(
    get,
    path = "/game",
    tag = "game",
    responses((status = 200, description = "Current game state", body = GameView))
)]
pub async fn get_game(State(state): State<SharedState>) -> Json<GameView> {
    Json(game_service::current_view(&state).await)
}

/// Search artists by name. Only available from the menu.
#[utoipa::path(
    get,
    path = "/artists/search",
    tag = "game",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching artists", body = SearchResponse),
        (status = 400, description = "Blank or oversized query"),
        (status = 409, description = "Not in the menu"),
        (status = 502, description = "Catalog unavailable")
    )
)]
pub async fn search_artists(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    query.validate()?;
    let response = game_service::search_artists(&state, &query.q).await?;
    Ok(Json(response))
}

/// Start a game on an artist from the latest search.
#[utoipa::path(
    post,
    path = "/game/specific",
    tag = "game",
    request_body = StartSpecificRequest,
    responses(
        (status = 200, description = "Round started or pool cleared", body = GameView),
        (status = 404, description = "Artist not part of the search results"),
        (status = 409, description = "Not in the menu or already loading"),
        (status = 502, description = "No round could be loaded")
    )
)]
pub async fn start_specific(
    State(state): State<SharedState>,
    Json(payload): Json<StartSpecificRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = game_service::start_specific(&state, payload).await?;
    Ok(Json(view))
}

/// Start a game drawing a random artist for every round.
#[utoipa::path(
    post,
    path = "/game/random",
    tag = "game",
    request_body = StartRandomRequest,
    responses(
        (status = 200, description = "Round started", body = GameView),
        (status = 409, description = "Not in the menu or already loading"),
        (status = 502, description = "No round could be loaded")
    )
)]
pub async fn start_random(
    State(state): State<SharedState>,
    Json(payload): Json<StartRandomRequest>,
) -> Result<Json<GameView>, AppError> {
    let view = game_service::start_random(&state, payload).await?;
    Ok(Json(view))
}

/// Submit a guess for the running round.
#[utoipa::path(
    post,
    path = "/game/guess",
    tag = "game",
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Guess evaluated", body = GuessResponse),
        (status = 409, description = "No round running")
    )
)]
pub async fn submit_guess(
    State(state): State<SharedState>,
    Json(payload): Json<GuessRequest>,
) -> Result<Json<GuessResponse>, AppError> {
    payload.validate()?;
    let response = game_service::submit_guess(&state, &payload.guess).await?;
    Ok(Json(response))
}

/// Buy the next hint level.
#[utoipa::path(
    post,
    path = "/game/hint",
    tag = "game",
    responses(
        (status = 200, description = "Hint advanced or already complete", body = GameView),
        (status = 402, description = "Not enough XP"),
        (status = 409, description = "No round running")
    )
)]
pub async fn request_hint(State(state): State<SharedState>) -> Result<Json<GameView>, AppError> {
    let view = game_service::request_hint(&state).await?;
    Ok(Json(view))
}

/// Pay to give up the running round.
#[utoipa::path(
    post,
    path = "/game/skip",
    tag = "game",
    responses(
        (status = 200, description = "Round skipped", body = GameView),
        (status = 402, description = "Not enough XP"),
        (status = 409, description = "No round running")
    )
)]
pub async fn skip_round(State(state): State<SharedState>) -> Result<Json<GameView>, AppError> {
    let view = game_service::skip_round(&state).await?;
    Ok(Json(view))
}

/// Load the next round after a win or a loss.
#[utoipa::path(
    post,
    path = "/game/next",
    tag = "game",
    responses(
        (status = 200, description = "Round started or pool cleared", body = GameView),
        (status = 409, description = "The round is not over"),
        (status = 502, description = "No round could be loaded")
    )
)]
pub async fn next_round(State(state): State<SharedState>) -> Result<Json<GameView>, AppError> {
    let view = game_service::next_round(&state).await?;
    Ok(Json(view))
}

/// Play an artist again once every release was played.
#[utoipa::path(
    post,
    path = "/game/replay",
    tag = "game",
    responses(
        (status = 200, description = "Round started", body = GameView),
        (status = 409, description = "The artist pool is not cleared"),
        (status = 502, description = "No round could be loaded")
    )
)]
pub async fn replay_artist(State(state): State<SharedState>) -> Result<Json<GameView>, AppError> {
    let view = game_service::replay_artist(&state).await?;
    Ok(Json(view))
}

/// Leave the game for the menu. XP is kept.
#[utoipa::path(
    post,
    path = "/game/quit",
    tag = "game",
    request_body = QuitRequest,
    responses(
        (status = 200, description = "Back in the menu", body = GameView),
        (status = 400, description = "Quit not confirmed"),
        (status = 409, description = "Already in the menu")
    )
)]
pub async fn quit_game(
    State(state): State<SharedState>,
    Json(payload): Json<QuitRequest>,
) -> Result<Json<GameView>, AppError> {
    let view = game_service::quit_game(&state, payload.confirm).await?;
    Ok(Json(view))
}
