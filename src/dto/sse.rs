use serde::Serialize;
use utoipa::ToSchema;

use crate::state::round::RoundId;

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event whose data is already text.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the score can currently not be persisted.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when score persistence starts or stops failing.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast every second while a timed round runs.
pub struct TimerTickEvent {
    /// Round the countdown belongs to.
    #[schema(value_type = String, format = Uuid)]
    pub round_id: RoundId,
    pub remaining_seconds: u32,
}

/// Category of a toast shown by the presentation.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Hint or skip refused for lack of XP.
    InsufficientScore,
    /// A round could not be loaded.
    LoadFailed,
    /// Every release of the artist was played.
    AllCleared,
}

#[derive(Debug, Serialize, ToSchema)]
/// Transient message for the player.
pub struct NoticeEvent {
    pub kind: NoticeKind,
    pub message: String,
}
