use std::path::PathBuf;

use thiserror::Error;

use crate::dao::storage::StorageError;

pub type FileResult<T> = Result<T, FileStoreError>;

/// Failures of the file-backed score store.
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("failed to read score file `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write score file `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("score directory `{}` is not usable", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("score file `{}` is not valid JSON", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode score document")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

impl From<FileStoreError> for StorageError {
    fn from(err: FileStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
