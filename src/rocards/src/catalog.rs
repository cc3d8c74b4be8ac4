//! Immutable card catalog, partitioned into rare and normal pools.
//!
//! The catalog is loaded once at startup and shared read-only for the life
//! of the process. Construction validates the two invariants the draw
//! engine depends on: the catalog is non-empty and identifiers are unique.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::card::Card;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog contains no cards")]
    Empty,

    #[error("Duplicate card id in catalog: {0}")]
    DuplicateId(i32),
}

#[derive(Debug, Clone)]
pub struct Catalog {
    cards: Vec<Card>,
    rare: Vec<Card>,
    normal: Vec<Card>,
}

impl Catalog {
    /// Build a catalog from a list of cards, partitioning by rarity flag.
    pub fn new(cards: Vec<Card>) -> Result<Self, CatalogError> {
        if cards.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(card.id) {
                return Err(CatalogError::DuplicateId(card.id));
            }
        }

        let (rare, normal): (Vec<Card>, Vec<Card>) =
            cards.iter().cloned().partition(Card::is_rare);

        Ok(Self {
            cards,
            rare,
            normal,
        })
    }

    /// Parse a catalog document (a JSON array of cards)
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    /// Load a catalog document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path.as_ref())?;
        Self::from_json(&data)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn rare(&self) -> &[Card] {
        &self.rare
    }

    pub fn normal(&self) -> &[Card] {
        &self.normal
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Always false for a constructed catalog
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Look up a card by identifier
    pub fn get(&self, id: i32) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.get(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn card(id: i32, mvp: bool) -> Card {
        Card {
            id,
            aegis_name: format!("Card_{id}"),
            name: format!("Card {id}"),
            card_type: "Card".into(),
            mvp,
            description: String::new(),
        }
    }

    fn ids(cards: &[Card]) -> HashSet<i32> {
        cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_partition_covers_catalog() {
        let catalog = Catalog::new(vec![
            card(1, false),
            card(2, true),
            card(3, false),
            card(4, true),
            card(5, false),
        ])
        .unwrap();

        let rare = ids(catalog.rare());
        let normal = ids(catalog.normal());

        assert!(rare.is_disjoint(&normal));
        let union: HashSet<i32> = rare.union(&normal).copied().collect();
        assert_eq!(union, ids(catalog.cards()));
        assert_eq!(catalog.rare().len(), 2);
        assert_eq!(catalog.normal().len(), 3);
    }

    #[test]
    fn test_partition_preserves_document_order() {
        let catalog =
            Catalog::new(vec![card(9, true), card(3, false), card(7, true), card(1, false)])
                .unwrap();

        let rare: Vec<i32> = catalog.rare().iter().map(|c| c.id).collect();
        let normal: Vec<i32> = catalog.normal().iter().map(|c| c.id).collect();
        assert_eq!(rare, vec![9, 7]);
        assert_eq!(normal, vec![3, 1]);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(Catalog::new(Vec::new()), Err(CatalogError::Empty)));
        assert!(matches!(Catalog::from_json("[]"), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Catalog::new(vec![card(1, false), card(2, true), card(1, true)]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(1))));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            Catalog::from_json("{\"not\": \"a list\"}"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_get_by_id() {
        let catalog = Catalog::new(vec![card(10, false), card(20, true)]).unwrap();

        assert_eq!(catalog.get(20).map(|c| c.mvp), Some(true));
        assert!(catalog.get(30).is_none());
        assert!(catalog.contains(10));
        assert!(!catalog.contains(11));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cards.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(
            br#"[
                {"id": 4001, "AegisName": "Poring_Card", "name": "Poring Card",
                 "type": "Card", "Description": "LUK +2"},
                {"id": 4147, "AegisName": "Baphomet_Card", "name": "Baphomet Card",
                 "type": "Card", "mvp": true, "Description": "Splash attack"}
            ]"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.rare()[0].id, 4147);
        assert_eq!(catalog.normal()[0].id, 4001);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = Catalog::load(temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }

    #[test]
    fn test_bundled_catalog() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../share/cards.json");
        let catalog = Catalog::load(path).unwrap();
        assert_eq!(catalog.len(), 21);
        assert_eq!(catalog.rare().len(), 6);
        assert_eq!(catalog.normal().len(), 15);
        assert!(catalog.rare().iter().all(|c| c.mvp));
    }
}
