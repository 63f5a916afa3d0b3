//! Name resolution records (`POST /universe/names/`)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Resolved ID → display name map
pub type NameMap = HashMap<i64, String>;

/// Entity kind reported by the names endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCategory {
    Alliance,
    Character,
    Constellation,
    Corporation,
    InventoryType,
    Region,
    SolarSystem,
    Station,
    Faction,
    #[serde(other)]
    Unknown,
}

/// One entry of a names response
///
/// `id` and `name` are required; a response element missing either fails
/// the whole batch. Unrecognised categories map to `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub id: i64,
    pub name: String,
    pub category: NameCategory,
}
