//! Collection ledger service.
//!
//! Wraps a [`CollectionRepository`] with the aggregation step: a batch of
//! drawn cards is tallied per card id and written with one additive upsert,
//! so repeated copies in a batch collapse into a single increment.

use rocards::Card;

use crate::repository::{CollectionRepository, RepoResult};
use crate::types::{tally, Collection, LedgerStats};

pub struct CollectionLedger<R> {
    repo: R,
}

impl<R: CollectionRepository> CollectionLedger<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Merge cards into the user's collection. Empty input is a no-op.
    pub async fn add_cards(&self, user_id: &str, cards: &[Card]) -> RepoResult<()> {
        if cards.is_empty() {
            return Ok(());
        }

        let counts = tally(cards);
        tracing::debug!(
            user_id,
            cards = cards.len(),
            distinct = counts.len(),
            "Adding cards to collection"
        );
        self.repo.upsert_quantities(user_id, &counts).await
    }

    /// Read a user's collection; unknown users yield an empty collection
    pub async fn get_collection(&self, user_id: &str) -> RepoResult<Collection> {
        let entries = self.repo.list_entries(user_id).await?;
        tracing::debug!(user_id, entries = entries.len(), "Loaded collection");
        Ok(Collection::from_entries(user_id, entries))
    }

    pub async fn get_card_quantity(&self, user_id: &str, card_id: i32) -> RepoResult<i64> {
        self.repo.quantity(user_id, card_id).await
    }

    pub async fn stats(&self) -> RepoResult<LedgerStats> {
        self.repo.stats().await
    }
}

#[cfg(all(test, feature = "sqlx-sqlite"))]
mod tests {
    use super::*;
    use crate::repository::RepoError;
    use crate::sqlx_impl::sqlite::SqlxSqliteDb;
    use crate::sqlx_impl::LedgerDb;
    use std::sync::Arc;

    fn card(id: i32) -> Card {
        Card {
            id,
            aegis_name: format!("Card_{id}"),
            name: format!("Card {id}"),
            card_type: "Card".into(),
            mvp: false,
            description: String::new(),
        }
    }

    async fn setup_ledger() -> CollectionLedger<SqlxSqliteDb> {
        let db = SqlxSqliteDb::connect_in_memory().await.unwrap();
        db.init().await.unwrap();
        CollectionLedger::new(db)
    }

    #[tokio::test]
    async fn test_batched_equals_sequential() {
        let batched = setup_ledger().await;
        let sequential = setup_ledger().await;
        let (a, b) = (card(1), card(2));

        batched
            .add_cards("u", &[a.clone(), a.clone(), b.clone()])
            .await
            .unwrap();
        for c in [&a, &a, &b] {
            sequential
                .add_cards("u", std::slice::from_ref(c))
                .await
                .unwrap();
        }

        let left = batched.get_collection("u").await.unwrap();
        let right = sequential.get_collection("u").await.unwrap();
        assert_eq!(left, right);
        assert_eq!(left.quantity_of(1), 2);
        assert_eq!(left.quantity_of(2), 1);
    }

    #[tokio::test]
    async fn test_empty_add_is_noop() {
        let ledger = setup_ledger().await;

        ledger.add_cards("u", &[]).await.unwrap();

        let collection = ledger.get_collection("u").await.unwrap();
        assert!(collection.is_empty());
        assert_eq!(ledger.stats().await.unwrap().entry_count, 0);
    }

    #[tokio::test]
    async fn test_quantity_is_cumulative() {
        let ledger = setup_ledger().await;
        let c = card(4001);

        ledger.add_cards("u", &[c.clone()]).await.unwrap();
        assert_eq!(ledger.get_card_quantity("u", c.id).await.unwrap(), 1);

        ledger.add_cards("u", &[c.clone()]).await.unwrap();
        assert_eq!(ledger.get_card_quantity("u", c.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_and_card() {
        let ledger = setup_ledger().await;

        let collection = ledger.get_collection("no-such-user").await.unwrap();
        assert_eq!(collection.user_id, "no-such-user");
        assert!(collection.entries.is_empty());
        assert_eq!(collection.total_cards, 0);
        assert_eq!(ledger.get_card_quantity("u", 99999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_total_equals_sum_of_entries() {
        let ledger = setup_ledger().await;

        let batches: Vec<Vec<i32>> = vec![
            vec![1, 1, 2],
            vec![3],
            vec![2, 2, 2, 5],
            vec![],
            vec![1, 5, 8, 13, 21],
        ];
        for batch in &batches {
            let cards: Vec<Card> = batch.iter().map(|id| card(*id)).collect();
            ledger.add_cards("u", &cards).await.unwrap();
        }

        let collection = ledger.get_collection("u").await.unwrap();
        let sum: i64 = collection.entries.iter().map(|e| e.quantity).sum();
        let added: usize = batches.iter().map(Vec::len).sum();
        assert_eq!(collection.total_cards, sum);
        assert_eq!(collection.total_cards, added as i64);
        assert_eq!(collection.quantity_of(2), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_not_lost() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("collections.db");
        let db = LedgerDb::connect(path.to_str().unwrap()).await.unwrap();
        db.init().await.unwrap();
        let ledger = Arc::new(CollectionLedger::new(db));

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move {
                    ledger
                        .add_cards("u", &[card(1), card(1), card(2)])
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(ledger.get_card_quantity("u", 1).await.unwrap(), 128);
        assert_eq!(ledger.get_card_quantity("u", 2).await.unwrap(), 64);
        assert_eq!(ledger.get_collection("u").await.unwrap().total_cards, 192);
    }

    #[tokio::test]
    async fn test_missing_schema_is_reported() {
        let db = SqlxSqliteDb::connect_in_memory().await.unwrap();
        let ledger = CollectionLedger::new(db);

        let result = ledger.add_cards("u", &[card(1)]).await;
        assert!(matches!(result, Err(RepoError::Database(_))));

        let result = ledger.get_collection("u").await;
        assert!(matches!(result, Err(RepoError::Database(_))));

        let result = ledger.get_card_quantity("u", 1).await;
        assert!(matches!(result, Err(RepoError::Database(_))));
    }

    #[tokio::test]
    async fn test_closed_pool_is_reported() {
        let ledger = setup_ledger().await;
        ledger.add_cards("u", &[card(1)]).await.unwrap();

        ledger.repository().pool().close().await;

        let result = ledger.add_cards("u", &[card(1)]).await;
        assert!(matches!(result, Err(RepoError::Database(_))));
        assert!(ledger.stats().await.is_err());
    }
}
