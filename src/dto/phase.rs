use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::GamePhase;

/// Publicly visible game phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleGamePhase {
    /// Menu: search an artist or start a random game.
    Menu,
    /// A round is running.
    Playing,
    /// The last round was won.
    Won,
    /// The last round was lost (see the loss reason).
    Lost,
    /// Every release of the artist at this difficulty has been played.
    AllCleared,
}

impl From<&GamePhase> for VisibleGamePhase {
    fn from(value: &GamePhase) -> Self {
        match value {
            GamePhase::Menu => VisibleGamePhase::Menu,
            GamePhase::Playing => VisibleGamePhase::Playing,
            GamePhase::Won => VisibleGamePhase::Won,
            GamePhase::Lost(_) => VisibleGamePhase::Lost,
            GamePhase::AllCleared => VisibleGamePhase::AllCleared,
        }
    }
}
