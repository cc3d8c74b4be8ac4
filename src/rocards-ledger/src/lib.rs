//! Collection ledger for the rocards card game.
//!
//! This library records how many copies of each card a user owns. It
//! provides a trait-based abstraction over the durable store, with SQLx
//! implementations for SQLite and PostgreSQL, and a [`CollectionLedger`]
//! service that aggregates drawn cards before writing them.
//!
//! # Features
//!
//! - `sqlx-sqlite` (default) - Async SQLite using SQLx
//! - `sqlx-postgres` - Async PostgreSQL using SQLx
//! - `utoipa` - OpenAPI schemas for the collection types
//!
//! # Example
//!
//! ```ignore
//! use rocards_ledger::{CollectionLedger, CollectionRepository, SqlxSqliteDb};
//!
//! async fn example(cards: &[rocards::Card]) {
//!     let db = SqlxSqliteDb::connect("sqlite:collections.db?mode=rwc").await.unwrap();
//!     db.init().await.unwrap();
//!
//!     let ledger = CollectionLedger::new(db);
//!     ledger.add_cards("alice", cards).await.unwrap();
//!     let collection = ledger.get_collection("alice").await.unwrap();
//! }
//! ```

pub mod ledger;
pub mod repository;
pub mod shared;
pub mod types;

#[cfg(any(feature = "sqlx-sqlite", feature = "sqlx-postgres"))]
pub mod sqlx_impl;

pub use ledger::CollectionLedger;
pub use repository::{CollectionRepository, RepoError, RepoResult};
pub use types::*;

#[cfg(any(feature = "sqlx-sqlite", feature = "sqlx-postgres"))]
pub use sqlx_impl::LedgerDb;

#[cfg(feature = "sqlx-sqlite")]
pub use sqlx_impl::sqlite::SqlxSqliteDb;

#[cfg(feature = "sqlx-postgres")]
pub use sqlx_impl::postgres::SqlxPgDb;
