pub mod file;
#[cfg(test)]
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;

/// Durable home of the player's XP balance.
pub trait ScoreStore: Send + Sync {
    /// Last saved balance; `0` when nothing was ever saved.
    fn load(&self) -> BoxFuture<'static, StorageResult<u64>>;
    /// Replace the saved balance.
    fn save(&self, score: u64) -> BoxFuture<'static, StorageResult<()>>;
    /// Whether saving is currently possible.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
