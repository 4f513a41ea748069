/// Music catalog access (artists and releases).
pub mod catalog;
/// Durable XP balance.
pub mod score_store;
/// Storage error shared by persistence backends.
pub mod storage;
