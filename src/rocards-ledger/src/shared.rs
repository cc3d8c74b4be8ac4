//! Shared SQL and batching helpers for the database implementations.
//!
//! Both SQLx backends speak the same `ON CONFLICT` upsert dialect, so the
//! statement fragments live here and each backend only supplies its own
//! placeholder style through `sqlx::QueryBuilder`.

use std::collections::BTreeMap;

use crate::repository::{RepoError, RepoResult};

/// Rows per upsert statement. Three binds per row keeps every chunk well
/// under the SQLite and PostgreSQL bind parameter limits.
pub const UPSERT_CHUNK_ROWS: usize = 500;

/// Schema definitions
pub mod schema {
    /// Collections table (valid for SQLite and PostgreSQL)
    pub const COLLECTIONS_TABLE: &str = r#"
        CREATE TABLE IF NOT EXISTS collections (
            user_id TEXT NOT NULL,
            card_id INTEGER NOT NULL,
            quantity BIGINT NOT NULL DEFAULT 1 CHECK (quantity >= 0),
            PRIMARY KEY (user_id, card_id)
        )
    "#;

    pub const INDEXES: &[&str] =
        &["CREATE INDEX IF NOT EXISTS idx_collections_user_id ON collections(user_id)"];
}

/// Head of the batched upsert; `push_values` appends the rows
pub const UPSERT_PREFIX: &str = "INSERT INTO collections (user_id, card_id, quantity) ";

/// Additive conflict resolution
pub const UPSERT_CONFLICT: &str = " ON CONFLICT (user_id, card_id) \
     DO UPDATE SET quantity = collections.quantity + excluded.quantity";

/// Validate a tally and flatten it into chunks of upsert rows.
///
/// Quantities only ever grow, so a non-positive count is rejected before
/// any statement is issued.
pub fn upsert_chunks(counts: &BTreeMap<i32, i64>) -> RepoResult<Vec<Vec<(i32, i64)>>> {
    if let Some((card_id, count)) = counts.iter().find(|(_, count)| **count <= 0) {
        return Err(RepoError::InvalidInput(format!(
            "non-positive quantity {} for card {}",
            count, card_id
        )));
    }

    let rows: Vec<(i32, i64)> = counts.iter().map(|(id, count)| (*id, *count)).collect();
    Ok(rows
        .chunks(UPSERT_CHUNK_ROWS)
        .map(|chunk| chunk.to_vec())
        .collect())
}
