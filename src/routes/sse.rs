use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::{info, warn};

use crate::{
    dto::sse::{Handshake, ServerEvent},
    services::{game_service, sse_service},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Public SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime game events to connected frontends.
///
/// The new subscriber first receives a `handshake` and the current `game.state`.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_public(&state);
    info!("New public SSE connection");
    sse_service::broadcast_public_info(state.public_sse(), "public stream connected");

    let handshake = Handshake {
        stream: "public".into(),
        message: "subscribed to game events".into(),
        degraded: state.is_degraded(),
    };
    let view = game_service::current_view(&state).await;
    let greeting = [
        ServerEvent::json(Some("handshake".to_string()), &handshake),
        ServerEvent::json(Some("game.state".to_string()), &view),
    ];
    for event in greeting {
        match event {
            Ok(event) => state.public_sse().broadcast(event),
            Err(err) => warn!(error = %err, "failed to serialize SSE greeting"),
        }
    }

    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/public", get(public_stream))
}
