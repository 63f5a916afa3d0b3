//! Character data schemas (ESI `/characters/{id}/...`)
//!
//! Only the fields the dashboard reads are modelled; unknown fields are
//! ignored. A response missing a required field fails to parse and the
//! corresponding dashboard field becomes unavailable.

use serde::{Deserialize, Serialize};

/// `GET /characters/{id}/skills/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSummary {
    pub total_sp: i64,
    #[serde(default)]
    pub unallocated_sp: Option<i64>,
}

/// `GET /characters/{id}/location/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterLocation {
    pub solar_system_id: i64,
    #[serde(default)]
    pub station_id: Option<i64>,
    #[serde(default)]
    pub structure_id: Option<i64>,
}

/// One element of `GET /characters/{id}/assets/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetItem {
    pub item_id: i64,
    pub type_id: i64,
    pub location_id: i64,
    pub location_flag: String,
    pub quantity: i64,
    #[serde(default)]
    pub is_singleton: bool,
}
