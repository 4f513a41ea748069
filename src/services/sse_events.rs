use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        game::GameView,
        sse::{NoticeEvent, NoticeKind, ServerEvent, SystemStatus, TimerTickEvent},
    },
    state::{SharedState, round::RoundId},
};

const EVENT_GAME_STATE: &str = "game.state";
const EVENT_TIMER_TICK: &str = "timer.tick";
const EVENT_NOTICE: &str = "notice";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the full game view after a transition.
pub fn broadcast_game_state(state: &SharedState, view: &GameView) {
    send_public_event(state, EVENT_GAME_STATE, view);
}

/// Broadcast the seconds left on the running countdown.
pub fn broadcast_timer_tick(state: &SharedState, round_id: RoundId, remaining_seconds: u32) {
    let payload = TimerTickEvent {
        round_id,
        remaining_seconds,
    };
    send_public_event(state, EVENT_TIMER_TICK, &payload);
}

/// Broadcast a toast for the player.
pub fn broadcast_notice(state: &SharedState, kind: NoticeKind, message: impl Into<String>) {
    let payload = NoticeEvent {
        kind,
        message: message.into(),
    };
    send_public_event(state, EVENT_NOTICE, &payload);
}

/// Broadcast that score persistence started or stopped failing.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_public_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
