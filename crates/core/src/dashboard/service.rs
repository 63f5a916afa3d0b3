//! Dashboard loading service - core business logic
//!
//! 1. Refresh the access token (failure makes every field unavailable)
//! 2. Persist a rotated refresh token, best effort
//! 3. Fetch wallet, skills, location and assets concurrently
//! 4. Resolve every discovered ID in one resolver call
//! 5. Assemble per-field results, falling back to raw IDs for names

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::join;
use rda_domain::constants::{ASSET_DISPLAY_LIMIT, NPC_STATION_IDS};
use rda_domain::{
    AssetItem, AssetView, CharacterLocation, DashboardView, Field, InternalSessionIdentity,
    LocationView, NameMap, NamedId, SessionMetadata,
};
use tracing::{debug, warn};

use super::ports::CharacterData;
use crate::auth::ports::SessionProvider;
use crate::auth::refresh::TokenRefreshService;
use crate::names::ports::NameDirectory;

pub struct DashboardService {
    refresher: TokenRefreshService,
    sessions: Arc<dyn SessionProvider>,
    data: Arc<dyn CharacterData>,
    names: Arc<dyn NameDirectory>,
}

impl DashboardService {
    pub fn new(
        refresher: TokenRefreshService,
        sessions: Arc<dyn SessionProvider>,
        data: Arc<dyn CharacterData>,
        names: Arc<dyn NameDirectory>,
    ) -> Self {
        Self { refresher, sessions, data, names }
    }

    /// Load the dashboard for a signed-in identity
    ///
    /// Never fails as a whole; each field reports its own availability.
    pub async fn load(&self, identity: &InternalSessionIdentity) -> DashboardView {
        let metadata = &identity.metadata;
        let character_id = metadata.character_id;

        let access = match self.refresher.refresh(&metadata.refresh_token).await {
            Ok(access) => access,
            Err(_) => return unavailable_view(metadata),
        };

        if let Some(rotated) = access.rotated_refresh_token.as_ref() {
            self.persist_rotation(identity, rotated).await;
        }

        let token = access.access_token.as_str();
        let (wallet, skills, location, assets) = join!(
            self.data.wallet_balance(character_id, token),
            self.data.skills(character_id, token),
            self.data.location(character_id, token),
            self.data.assets(character_id, token),
        );

        for (field, failed) in [
            ("wallet", wallet.is_err()),
            ("skills", skills.is_err()),
            ("location", location.is_err()),
            ("assets", assets.is_err()),
        ] {
            if failed {
                warn!(character_id, field, "dashboard_field_unavailable");
            }
        }

        let assets = assets.map(|mut items| {
            items.truncate(ASSET_DISPLAY_LIMIT);
            items
        });

        let ids = collect_ids(location.as_ref().ok(), assets.as_deref().ok());
        let names = if ids.is_empty() { NameMap::new() } else { self.names.resolve(&ids).await };
        debug!(character_id, requested = ids.len(), resolved = names.len(), "dashboard_names");

        DashboardView {
            character_id,
            character_name: metadata.character_name.clone(),
            wallet: wallet.into(),
            skills: skills.into(),
            location: location.map(|loc| location_view(&loc, &names)).into(),
            assets: assets.map(|items| asset_views(&items, &names)).into(),
        }
    }

    async fn persist_rotation(&self, identity: &InternalSessionIdentity, rotated: &str) {
        let metadata =
            SessionMetadata { refresh_token: rotated.to_string(), ..identity.metadata.clone() };
        match self.sessions.upsert_account(&identity.account.login_key, &metadata).await {
            Ok(_) => debug!(character_id = metadata.character_id, "refresh_token_rotated"),
            Err(e) => warn!(
                character_id = metadata.character_id,
                error = %e,
                "refresh_token_rotation_not_persisted"
            ),
        }
    }
}

fn unavailable_view(metadata: &SessionMetadata) -> DashboardView {
    DashboardView {
        character_id: metadata.character_id,
        character_name: metadata.character_name.clone(),
        wallet: Field::Unavailable,
        skills: Field::Unavailable,
        location: Field::Unavailable,
        assets: Field::Unavailable,
    }
}

/// IDs worth a names lookup, deduplicated and sorted
fn collect_ids(location: Option<&CharacterLocation>, assets: Option<&[AssetItem]>) -> Vec<i64> {
    let mut ids = BTreeSet::new();
    if let Some(location) = location {
        ids.insert(location.solar_system_id);
        ids.extend(location.station_id);
    }
    for item in assets.unwrap_or_default() {
        ids.insert(item.type_id);
        if NPC_STATION_IDS.contains(&item.location_id) {
            ids.insert(item.location_id);
        }
    }
    ids.into_iter().collect()
}

fn named(id: i64, names: &NameMap) -> NamedId {
    NamedId { id, name: names.get(&id).cloned().unwrap_or_else(|| id.to_string()) }
}

fn location_view(location: &CharacterLocation, names: &NameMap) -> LocationView {
    LocationView {
        solar_system: named(location.solar_system_id, names),
        station: location.station_id.map(|id| named(id, names)),
    }
}

fn asset_views(items: &[AssetItem], names: &NameMap) -> Vec<AssetView> {
    items
        .iter()
        .map(|item| AssetView {
            item_id: item.item_id,
            item_type: named(item.type_id, names),
            location: named(item.location_id, names),
            location_flag: item.location_flag.clone(),
            quantity: item.quantity,
        })
        .collect()
}
