use std::error::Error;
use thiserror::Error;

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error raised by catalog gateways regardless of the underlying service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be reached or answered with an error.
    #[error("catalog unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The catalog answered with data that cannot be played.
    #[error("catalog returned unusable data: {0}")]
    Unusable(String),
}

impl CatalogError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        CatalogError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
