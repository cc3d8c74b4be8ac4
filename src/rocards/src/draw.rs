//! Random draw engine.
//!
//! Each draw first rolls against the configured rare rate to pick a pool,
//! then selects uniformly within that pool. Packs are independent draws;
//! duplicates within a pack are expected.

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;

use crate::card::Card;
use crate::catalog::Catalog;

/// Probability that a single draw samples the rare (MVP) pool
pub const DEFAULT_RARE_RATE: f64 = 0.0025;

/// Cards per pack when the caller asks for a non-positive size
pub const DEFAULT_PACK_SIZE: usize = 8;

#[derive(Error, Debug, PartialEq)]
pub enum DrawError {
    #[error("Rare rate must be within [0, 1], got {0}")]
    InvalidRate(f64),
}

/// Normalize a requested pack size, substituting the default for `<= 0`.
pub fn pack_size(requested: i64) -> usize {
    if requested <= 0 {
        DEFAULT_PACK_SIZE
    } else {
        usize::try_from(requested).unwrap_or(usize::MAX)
    }
}

/// Weighted card generator over a shared, immutable catalog.
///
/// Holds no mutable state, so one engine can serve any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct DrawEngine {
    catalog: Arc<Catalog>,
    rare_rate: f64,
}

impl DrawEngine {
    pub fn new(catalog: Arc<Catalog>, rare_rate: f64) -> Result<Self, DrawError> {
        if !(0.0..=1.0).contains(&rare_rate) {
            return Err(DrawError::InvalidRate(rare_rate));
        }
        Ok(Self { catalog, rare_rate })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn rare_rate(&self) -> f64 {
        self.rare_rate
    }

    /// Draw one card using the thread-local RNG
    pub fn generate_one(&self) -> Card {
        self.generate_one_with(&mut rand::thread_rng())
    }

    /// Draw one card using the supplied RNG
    pub fn generate_one_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Card {
        let rare = self.catalog.rare();
        if !rare.is_empty() && rng.gen::<f64>() < self.rare_rate {
            return pick(rare, rng).clone();
        }

        let normal = self.catalog.normal();
        if !normal.is_empty() {
            return pick(normal, rng).clone();
        }

        pick(self.catalog.cards(), rng).clone()
    }

    /// Open a pack using the thread-local RNG
    pub fn generate_pack(&self, size: i64) -> Vec<Card> {
        self.generate_pack_with(size, &mut rand::thread_rng())
    }

    /// Open a pack of `size` independent draws (default size for `size <= 0`)
    pub fn generate_pack_with<R: Rng + ?Sized>(&self, size: i64, rng: &mut R) -> Vec<Card> {
        (0..pack_size(size))
            .map(|_| self.generate_one_with(rng))
            .collect()
    }
}

// Callers only pass non-empty pools; the catalog itself is non-empty by construction.
fn pick<'a, R: Rng + ?Sized>(pool: &'a [Card], rng: &mut R) -> &'a Card {
    &pool[rng.gen_range(0..pool.len())]
}
