use std::path::PathBuf;

/// Key the XP balance is stored under inside the score document.
pub const SCORE_KEY: &str = "pixel-cover.xp";

/// Where the file-backed score store keeps its document.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub path: PathBuf,
    pub key: String,
}

impl FileStoreConfig {
    /// Store the balance at `path` under the default key.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: SCORE_KEY.to_string(),
        }
    }

    /// Store the balance under another key (several profiles can share one file).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}
