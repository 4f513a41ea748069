use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Pixel Cover Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::game::get_game,
        crate::routes::game::search_artists,
        crate::routes::game::start_specific,
        crate::routes::game::start_random,
        crate::routes::game::submit_guess,
        crate::routes::game::request_hint,
        crate::routes::game::skip_round,
        crate::routes::game::next_round,
        crate::routes::game::replay_artist,
        crate::routes::game::quit_game,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::TimerTickEvent,
            crate::dto::sse::NoticeEvent,
            crate::dto::sse::NoticeKind,
            crate::dto::game::GameView,
            crate::dto::game::TargetView,
            crate::dto::game::TimerView,
            crate::dto::game::ArtistSummary,
            crate::dto::game::SearchResponse,
            crate::dto::game::GuessResponse,
            crate::dto::game::StartSpecificRequest,
            crate::dto::game::StartRandomRequest,
            crate::dto::game::GuessRequest,
            crate::dto::game::QuitRequest,
            crate::dto::phase::VisibleGamePhase,
            crate::state::game::Difficulty,
            crate::state::game::GameMode,
            crate::state::game::ItemKind,
            crate::state::game::GuessOutcome,
            crate::state::hint::HintLevel,
            crate::state::state_machine::LossReason,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "game", description = "Game actions"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_ids_are_documented_as_uuid_strings() {
        let doc: serde_json::Value =
            serde_json::from_str(&ApiDoc::openapi().to_json().unwrap()).unwrap();
        let schemas = &doc["components"]["schemas"];

        let tick = &schemas["TimerTickEvent"]["properties"]["round_id"];
        assert_eq!(tick["type"], "string");
        assert_eq!(tick["format"], "uuid");

        let view = &schemas["GameView"]["properties"]["round_id"];
        assert_eq!(view["format"], "uuid");
    }
}
