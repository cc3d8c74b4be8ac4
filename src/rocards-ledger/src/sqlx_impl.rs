//! SQLx implementation for async ledger storage.
//!
//! Supports both SQLite and PostgreSQL via SQLx.

use std::collections::BTreeMap;

use crate::repository::{CollectionRepository, RepoError, RepoResult};
use crate::shared;
use crate::types::{CollectionEntry, LedgerStats};

// =============================================================================
// SQLite implementation
// =============================================================================

#[cfg(feature = "sqlx-sqlite")]
pub mod sqlite {
    use super::*;
    use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};
    use sqlx::QueryBuilder;

    /// SQLite-backed async collection ledger
    pub struct SqlxSqliteDb {
        pool: SqlitePool,
    }

    impl SqlxSqliteDb {
        /// Connect to a SQLite database
        pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            Ok(Self { pool })
        }

        /// Open a private in-memory database.
        ///
        /// Every SQLite connection to `:memory:` is a separate database, so
        /// the pool is pinned to one connection that never expires.
        pub async fn connect_in_memory() -> Result<Self, sqlx::Error> {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?;
            Ok(Self { pool })
        }

        /// Connect with an existing pool
        pub fn with_pool(pool: SqlitePool) -> Self {
            Self { pool }
        }

        /// Get the connection pool
        pub fn pool(&self) -> &SqlitePool {
            &self.pool
        }
    }

    impl CollectionRepository for SqlxSqliteDb {
        async fn init(&self) -> RepoResult<()> {
            sqlx::query(shared::schema::COLLECTIONS_TABLE)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            for sql in shared::schema::INDEXES {
                sqlx::query(sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| RepoError::Database(e.to_string()))?;
            }

            Ok(())
        }

        async fn upsert_quantities(
            &self,
            user_id: &str,
            counts: &BTreeMap<i32, i64>,
        ) -> RepoResult<()> {
            let chunks = shared::upsert_chunks(counts)?;
            if chunks.is_empty() {
                return Ok(());
            }

            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            for chunk in &chunks {
                let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(shared::UPSERT_PREFIX);
                builder.push_values(chunk, |mut row, (card_id, quantity)| {
                    row.push_bind(user_id)
                        .push_bind(*card_id)
                        .push_bind(*quantity);
                });
                builder.push(shared::UPSERT_CONFLICT);

                builder
                    .build()
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| RepoError::Database(e.to_string()))?;
            }

            tx.commit()
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
            Ok(())
        }

        async fn list_entries(&self, user_id: &str) -> RepoResult<Vec<CollectionEntry>> {
            let rows: Vec<(i32, i64)> = sqlx::query_as(
                "SELECT card_id, quantity FROM collections WHERE user_id = ? ORDER BY card_id",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

            Ok(rows
                .into_iter()
                .map(|(card_id, quantity)| CollectionEntry { card_id, quantity })
                .collect())
        }

        async fn quantity(&self, user_id: &str, card_id: i32) -> RepoResult<i64> {
            let row: Option<(i64,)> = sqlx::query_as(
                "SELECT quantity FROM collections WHERE user_id = ? AND card_id = ?",
            )
            .bind(user_id)
            .bind(card_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

            Ok(row.map_or(0, |(q,)| q))
        }

        async fn stats(&self) -> RepoResult<LedgerStats> {
            let (user_count, entry_count, total_cards): (i64, i64, i64) = sqlx::query_as(
                "SELECT COUNT(DISTINCT user_id), COUNT(*), COALESCE(SUM(quantity), 0) FROM collections",
            )
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

            Ok(LedgerStats {
                user_count,
                entry_count,
                total_cards,
            })
        }
    }
}

// =============================================================================
// PostgreSQL implementation
// =============================================================================

#[cfg(feature = "sqlx-postgres")]
pub mod postgres {
    use super::*;
    use sqlx::postgres::{PgPool, PgPoolOptions, Postgres};
    use sqlx::QueryBuilder;
    use std::time::Duration;

    /// PostgreSQL-backed async collection ledger
    pub struct SqlxPgDb {
        pool: PgPool,
    }

    impl SqlxPgDb {
        /// Connect to a PostgreSQL database
        pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
            let pool = PgPoolOptions::new()
                .max_connections(25)
                .max_lifetime(Duration::from_secs(5 * 60))
                .connect(url)
                .await?;
            Ok(Self { pool })
        }

        /// Connect with an existing pool
        pub fn with_pool(pool: PgPool) -> Self {
            Self { pool }
        }

        /// Get the connection pool
        pub fn pool(&self) -> &PgPool {
            &self.pool
        }
    }

    impl CollectionRepository for SqlxPgDb {
        async fn init(&self) -> RepoResult<()> {
            sqlx::query(shared::schema::COLLECTIONS_TABLE)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            for sql in shared::schema::INDEXES {
                sqlx::query(sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| RepoError::Database(e.to_string()))?;
            }

            Ok(())
        }

        async fn upsert_quantities(
            &self,
            user_id: &str,
            counts: &BTreeMap<i32, i64>,
        ) -> RepoResult<()> {
            let chunks = shared::upsert_chunks(counts)?;
            if chunks.is_empty() {
                return Ok(());
            }

            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            for chunk in &chunks {
                let mut builder: QueryBuilder<Postgres> =
                    QueryBuilder::new(shared::UPSERT_PREFIX);
                builder.push_values(chunk, |mut row, (card_id, quantity)| {
                    row.push_bind(user_id)
                        .push_bind(*card_id)
                        .push_bind(*quantity);
                });
                builder.push(shared::UPSERT_CONFLICT);

                builder
                    .build()
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| RepoError::Database(e.to_string()))?;
            }

            tx.commit()
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
            Ok(())
        }

        async fn list_entries(&self, user_id: &str) -> RepoResult<Vec<CollectionEntry>> {
            let rows: Vec<(i32, i64)> = sqlx::query_as(
                "SELECT card_id, quantity FROM collections WHERE user_id = $1 ORDER BY card_id",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

            Ok(rows
                .into_iter()
                .map(|(card_id, quantity)| CollectionEntry { card_id, quantity })
                .collect())
        }

        async fn quantity(&self, user_id: &str, card_id: i32) -> RepoResult<i64> {
            let row: Option<(i64,)> = sqlx::query_as(
                "SELECT quantity FROM collections WHERE user_id = $1 AND card_id = $2",
            )
            .bind(user_id)
            .bind(card_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

            Ok(row.map_or(0, |(q,)| q))
        }

        async fn stats(&self) -> RepoResult<LedgerStats> {
            // SUM over BIGINT yields NUMERIC in PostgreSQL
            let (user_count, entry_count, total_cards): (i64, i64, i64) = sqlx::query_as(
                "SELECT COUNT(DISTINCT user_id), COUNT(*), COALESCE(SUM(quantity), 0)::BIGINT FROM collections",
            )
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

            Ok(LedgerStats {
                user_count,
                entry_count,
                total_cards,
            })
        }
    }
}

// =============================================================================
// Backend selection
// =============================================================================

/// Ledger database chosen at runtime from the connection URL
pub enum LedgerDb {
    #[cfg(feature = "sqlx-sqlite")]
    Sqlite(sqlite::SqlxSqliteDb),
    #[cfg(feature = "sqlx-postgres")]
    Postgres(postgres::SqlxPgDb),
}

impl LedgerDb {
    /// Connect based on the URL scheme.
    ///
    /// `postgres://` and `postgresql://` select PostgreSQL. `sqlite:` URLs are
    /// used as given; anything else is treated as a SQLite file path and
    /// created if missing.
    pub async fn connect(url: &str) -> RepoResult<Self> {
        if is_postgres_url(url) {
            Self::connect_postgres(url).await
        } else {
            Self::connect_sqlite(url).await
        }
    }

    #[cfg(feature = "sqlx-postgres")]
    async fn connect_postgres(url: &str) -> RepoResult<Self> {
        postgres::SqlxPgDb::connect(url)
            .await
            .map(Self::Postgres)
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    #[cfg(not(feature = "sqlx-postgres"))]
    async fn connect_postgres(_url: &str) -> RepoResult<Self> {
        Err(RepoError::InvalidInput(
            "PostgreSQL support is not enabled (feature sqlx-postgres)".into(),
        ))
    }

    #[cfg(feature = "sqlx-sqlite")]
    async fn connect_sqlite(url: &str) -> RepoResult<Self> {
        sqlite::SqlxSqliteDb::connect(&sqlite_url(url))
            .await
            .map(Self::Sqlite)
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    #[cfg(not(feature = "sqlx-sqlite"))]
    async fn connect_sqlite(url: &str) -> RepoResult<Self> {
        Err(RepoError::InvalidInput(format!(
            "SQLite support is not enabled (feature sqlx-sqlite): {}",
            sqlite_url(url)
        )))
    }

    /// Backend name for logging
    pub fn backend(&self) -> &'static str {
        match self {
            #[cfg(feature = "sqlx-sqlite")]
            Self::Sqlite(_) => "sqlite",
            #[cfg(feature = "sqlx-postgres")]
            Self::Postgres(_) => "postgres",
        }
    }
}

fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

/// Only local file paths get the `sqlite:` prefix and create mode
fn sqlite_url(url: &str) -> String {
    if url.starts_with("sqlite:") {
        url.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", url)
    }
}

impl CollectionRepository for LedgerDb {
    async fn init(&self) -> RepoResult<()> {
        match self {
            #[cfg(feature = "sqlx-sqlite")]
            Self::Sqlite(db) => db.init().await,
            #[cfg(feature = "sqlx-postgres")]
            Self::Postgres(db) => db.init().await,
        }
    }

    async fn upsert_quantities(&self, user_id: &str, counts: &BTreeMap<i32, i64>) -> RepoResult<()> {
        match self {
            #[cfg(feature = "sqlx-sqlite")]
            Self::Sqlite(db) => db.upsert_quantities(user_id, counts).await,
            #[cfg(feature = "sqlx-postgres")]
            Self::Postgres(db) => db.upsert_quantities(user_id, counts).await,
        }
    }

    async fn list_entries(&self, user_id: &str) -> RepoResult<Vec<CollectionEntry>> {
        match self {
            #[cfg(feature = "sqlx-sqlite")]
            Self::Sqlite(db) => db.list_entries(user_id).await,
            #[cfg(feature = "sqlx-postgres")]
            Self::Postgres(db) => db.list_entries(user_id).await,
        }
    }

    async fn quantity(&self, user_id: &str, card_id: i32) -> RepoResult<i64> {
        match self {
            #[cfg(feature = "sqlx-sqlite")]
            Self::Sqlite(db) => db.quantity(user_id, card_id).await,
            #[cfg(feature = "sqlx-postgres")]
            Self::Postgres(db) => db.quantity(user_id, card_id).await,
        }
    }

    async fn stats(&self) -> RepoResult<LedgerStats> {
        match self {
            #[cfg(feature = "sqlx-sqlite")]
            Self::Sqlite(db) => db.stats().await,
            #[cfg(feature = "sqlx-postgres")]
            Self::Postgres(db) => db.stats().await,
        }
    }
}
