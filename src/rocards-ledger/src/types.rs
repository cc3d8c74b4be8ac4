//! Collection types shared by every storage backend.

use std::collections::BTreeMap;

use rocards::Card;
use serde::{Deserialize, Serialize};

/// Owned quantity of one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    pub card_id: i32,
    pub quantity: i64,
}

/// A user's collection, rebuilt from the ledger on every read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub user_id: String,
    pub entries: Vec<CollectionEntry>,
    pub total_cards: i64,
}

impl Collection {
    /// Build a collection, deriving the total from the entries
    pub fn from_entries(user_id: impl Into<String>, entries: Vec<CollectionEntry>) -> Self {
        let total_cards = entries.iter().map(|e| e.quantity).sum();
        Self {
            user_id: user_id.into(),
            entries,
            total_cards,
        }
    }

    /// Quantity owned of a card, zero when absent
    pub fn quantity_of(&self, card_id: i32) -> i64 {
        self.entries
            .iter()
            .find(|e| e.card_id == card_id)
            .map_or(0, |e| e.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ledger statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub user_count: i64,
    pub entry_count: i64,
    pub total_cards: i64,
}

/// Collapse a batch of cards into per-card counts.
///
/// Keys are ordered so batched writes always visit rows in ascending
/// card id order.
pub fn tally<'a>(cards: impl IntoIterator<Item = &'a Card>) -> BTreeMap<i32, i64> {
    let mut counts = BTreeMap::new();
    for card in cards {
        *counts.entry(card.id).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_tally_collapses_duplicates() {
        let cards = vec![card(7), card(9), card(7), card(7)];
        let counts = tally(&cards);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&7], 3);
        assert_eq!(counts[&9], 1);
    }

    #[test]
    fn test_tally_is_order_independent() {
        let a = tally(&[card(1), card(2), card(1)]);
        let b = tally(&[card(2), card(1), card(1)]);
        assert_eq!(a, b);
        assert_eq!(a.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_tally_empty() {
        assert!(tally(&[]).is_empty());
    }

    #[test]
    fn test_collection_total_matches_entries() {
        let collection = Collection::from_entries(
            "alice",
            vec![
                CollectionEntry {
                    card_id: 1,
                    quantity: 3,
                },
                CollectionEntry {
                    card_id: 5,
                    quantity: 4,
                },
            ],
        );

        assert_eq!(collection.total_cards, 7);
        assert_eq!(collection.quantity_of(5), 4);
        assert_eq!(collection.quantity_of(99), 0);
    }

    #[test]
    fn test_collection_wire_format() {
        let collection = Collection::from_entries(
            "bob",
            vec![CollectionEntry {
                card_id: 4001,
                quantity: 2,
            }],
        );

        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["userId"], "bob");
        assert_eq!(value["totalCards"], 2);
        assert_eq!(value["entries"][0]["cardId"], 4001);
        assert_eq!(value["entries"][0]["quantity"], 2);
    }
}
