//! Card definitions as they appear in the catalog document.

use serde::{Deserialize, Serialize};

/// A single catalog entry.
///
/// Field names on the wire follow the catalog document, which mixes
/// `camelCase` and `PascalCase` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Card {
    pub id: i32,

    /// Internal ("true") name used by the game data
    #[serde(rename = "AegisName")]
    pub aegis_name: String,

    /// Display name
    pub name: String,

    /// Free-form type classification
    #[serde(rename = "type")]
    pub card_type: String,

    /// Boss-tier card drawn from the rare pool
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mvp: bool,

    #[serde(rename = "Description")]
    pub description: String,
}

impl Card {
    pub fn is_rare(&self) -> bool {
        self.mvp
    }
}
