mod config;
mod error;
mod store;

pub use config::{FileStoreConfig, SCORE_KEY};
pub use store::FileScoreStore;
