//! In-memory score store used by service tests.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};

use futures::future::BoxFuture;

use crate::dao::{
    score_store::ScoreStore,
    storage::{StorageError, StorageResult},
};

#[derive(Clone, Default)]
pub struct MemoryScoreStore {
    score: Arc<AtomicU64>,
    saves: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MemoryScoreStore {
    pub fn with_score(score: u64) -> Self {
        let store = Self::default();
        store.score.store(score, Ordering::SeqCst);
        store
    }

    pub fn score(&self) -> u64 {
        self.score.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::unavailable(
                "memory store switched off".into(),
                std::io::Error::other("offline"),
            ))
        } else {
            Ok(())
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store.check()?;
            Ok(store.score())
        })
    }

    fn save(&self, score: u64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.check()?;
            store.score.store(score, Ordering::SeqCst);
            store.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check() })
    }
}
