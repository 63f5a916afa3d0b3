//! Dashboard view returned by `GET /api/dashboard`

use serde::{Deserialize, Serialize};

use super::character::SkillSummary;

/// A dashboard field that either loaded or failed on its own
///
/// Serialized as `{"status":"ready","value":..}` or
/// `{"status":"unavailable"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Field<T> {
    Ready { value: T },
    Unavailable,
}

impl<T> Field<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready { value } => Some(value),
            Self::Unavailable => None,
        }
    }
}

impl<T, E> From<std::result::Result<T, E>> for Field<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready { value },
            Err(_) => Self::Unavailable,
        }
    }
}

/// An entity ID with its display name, or the ID itself when unresolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedId {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationView {
    pub solar_system: NamedId,
    pub station: Option<NamedId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetView {
    pub item_id: i64,
    pub item_type: NamedId,
    pub location: NamedId,
    pub location_flag: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub character_id: i64,
    pub character_name: String,
    pub wallet: Field<f64>,
    pub skills: Field<SkillSummary>,
    pub location: Field<LocationView>,
    pub assets: Field<Vec<AssetView>>,
}
