use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the score can be persisted, refreshing the degraded flag on the way.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.score_store().health_check().await {
        Ok(()) => {}
        Err(err) => {
            warn!(error = %err, "score storage health check failed");
            state.set_degraded(true);
        }
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
