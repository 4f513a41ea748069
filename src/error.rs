use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::{catalog::error::CatalogError, storage::StorageError},
    state::game::GameError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Score storage is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// The catalog could not be searched.
    #[error("artist search failed: {0}")]
    SearchFailed(#[source] CatalogError),
    /// The search (or the random pick) matched no artist.
    #[error("no artist found for `{0}`")]
    NoArtistsFound(String),
    /// No playable round could be loaded.
    #[error("could not load a round: {0}")]
    RoundLoadFailed(String),
    /// The XP balance does not cover the action.
    #[error("not enough points: {required} required, {available} available")]
    InsufficientScore { required: u64, available: u64 },
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        ServiceError::SearchFailed(err)
    }
}

impl From<GameError> for ServiceError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::InsufficientScore {
                required,
                available,
            } => ServiceError::InsufficientScore {
                required,
                available,
            },
            GameError::UnknownArtist(_) => ServiceError::NotFound(err.to_string()),
            GameError::InvalidPhase { .. } | GameError::LoadPending | GameError::StaleLoad => {
                ServiceError::InvalidState(err.to_string())
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The player cannot afford the action.
    #[error("{0}")]
    PaymentRequired(String),
    /// The music catalog failed.
    #[error("catalog error: {0}")]
    BadGateway(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::SearchFailed(source) => AppError::BadGateway(source.to_string()),
            ServiceError::RoundLoadFailed(message) => AppError::BadGateway(message),
            ServiceError::InsufficientScore { .. } => AppError::PaymentRequired(err.to_string()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NoArtistsFound(_) => AppError::NotFound(err.to_string()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::state_machine::GamePhase;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn game_errors_map_to_http_statuses() {
        assert_eq!(
            status_of(
                GameError::InsufficientScore {
                    required: 50,
                    available: 40
                }
                .into()
            ),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(GameError::UnknownArtist("x".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                GameError::InvalidPhase {
                    action: "hint",
                    phase: GamePhase::Menu
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(GameError::LoadPending.into()), StatusCode::CONFLICT);
    }

    #[test]
    fn upstream_failures_map_to_gateway_errors() {
        assert_eq!(
            status_of(ServiceError::RoundLoadFailed("no cover".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(CatalogError::Unusable("broken".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(
                StorageError::unavailable("disk".into(), std::io::Error::other("full")).into()
            ),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
