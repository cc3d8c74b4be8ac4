//! Repository trait for collection ledger storage.
//!
//! This trait defines the interface for all database backends. Writes go
//! through a single additive upsert; backends must never implement it as a
//! read followed by a write.

use std::collections::BTreeMap;

use crate::types::{CollectionEntry, LedgerStats};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Async trait for collection storage
#[allow(async_fn_in_trait)]
pub trait CollectionRepository {
    /// Create the schema if it does not exist
    async fn init(&self) -> RepoResult<()>;

    /// Add `counts` to the user's quantities in one batched upsert.
    ///
    /// Missing rows are created with the given count; existing rows are
    /// incremented by it. An empty map does not touch the store.
    async fn upsert_quantities(&self, user_id: &str, counts: &BTreeMap<i32, i64>)
        -> RepoResult<()>;

    /// All entries for a user, ordered by card id
    async fn list_entries(&self, user_id: &str) -> RepoResult<Vec<CollectionEntry>>;

    /// Quantity of one card for a user, zero when no row exists
    async fn quantity(&self, user_id: &str, card_id: i32) -> RepoResult<i64>;

    /// Get ledger statistics
    async fn stats(&self) -> RepoResult<LedgerStats>;
}
