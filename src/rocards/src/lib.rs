//! # rocards
//!
//! Card catalog and randomized draws for a trading-card collection game.
//!
//! This library provides:
//! - The [`Card`] model as stored in the catalog document
//! - An immutable [`Catalog`] partitioned into rare (MVP) and normal pools
//! - A [`DrawEngine`] producing single cards and fixed-size packs
//!
//! Enable the `utoipa` feature to derive OpenAPI schemas for [`Card`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(rocards::Catalog::load("share/cards.json")?);
//! let engine = rocards::DrawEngine::new(catalog, rocards::DEFAULT_RARE_RATE)?;
//!
//! let pack = engine.generate_pack(0);
//! assert_eq!(pack.len(), rocards::DEFAULT_PACK_SIZE);
//! # Ok(())
//! # }
//! ```

pub mod card;
pub mod catalog;
pub mod draw;

#[doc(inline)]
pub use card::Card;
#[doc(inline)]
pub use catalog::{Catalog, CatalogError};
#[doc(inline)]
pub use draw::{pack_size, DrawEngine, DrawError, DEFAULT_PACK_SIZE, DEFAULT_RARE_RATE};
