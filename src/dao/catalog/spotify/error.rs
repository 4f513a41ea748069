//! Error types of the Spotify catalog implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::catalog::error::CatalogError;

/// Convenient result alias returning [`SpotifyError`] failures.
pub type SpotifyResult<T> = Result<T, SpotifyError>;

/// Failures that can occur while talking to the Spotify Web API.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Required environment variable is missing.
    #[error("missing Spotify environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Spotify client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The token request could not be sent or decoded.
    #[error("failed to obtain Spotify access token")]
    TokenRequest {
        #[source]
        source: reqwest::Error,
    },
    /// The accounts service refused the client credentials.
    #[error("Spotify token endpoint answered {status}")]
    TokenStatus { status: StatusCode },
    /// A request to an API endpoint could not be sent.
    #[error("failed to send Spotify request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The API returned an unexpected status code.
    #[error("unexpected Spotify response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into the expected model.
    #[error("failed to decode Spotify response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<SpotifyError> for CatalogError {
    fn from(err: SpotifyError) -> Self {
        CatalogError::unavailable(err.to_string(), err)
    }
}
