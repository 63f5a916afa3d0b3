//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

use std::ops::Range;

// Upstream endpoints
pub const DEFAULT_SSO_BASE_URL: &str = "https://login.eveonline.com";
pub const DEFAULT_ESI_BASE_URL: &str = "https://esi.evetech.net/latest";
pub const SSO_AUTHORIZE_PATH: &str = "/v2/oauth/authorize";
pub const SSO_TOKEN_PATH: &str = "/v2/oauth/token";
pub const SSO_VERIFY_PATH: &str = "/oauth/verify";
pub const ESI_DATASOURCE: &str = "tranquility";

/// Scopes requested on every login.
pub const EVE_SCOPES: &[&str] = &[
    "publicData",
    "esi-skills.read_skills.v1",
    "esi-skills.read_skillqueue.v1",
    "esi-wallet.read_character_wallet.v1",
    "esi-assets.read_assets.v1",
    "esi-location.read_location.v1",
    "esi-location.read_ship_type.v1",
    "esi-location.read_online.v1",
    "esi-characters.read_corporation_roles.v1",
    "esi-markets.read_character_orders.v1",
    "esi-contracts.read_character_contracts.v1",
];

// Login attempts
pub const ATTEMPT_TTL_SECONDS: i64 = 600;
pub const LOGIN_KEY_NAMESPACE: &str = "eve";

// Name resolution
pub const DEFAULT_NAME_CACHE_TTL_SECONDS: u64 = 86_400;
pub const DEFAULT_NAME_CACHE_MAX_CAPACITY: u64 = 100_000;
/// `/universe/names/` rejects larger bodies.
pub const MAX_NAMES_PER_REQUEST: usize = 1_000;

// Dashboard
/// Location IDs in this range are NPC stations and resolvable by name.
pub const NPC_STATION_IDS: Range<i64> = 60_000_000..64_000_000;
pub const ASSET_DISPLAY_LIMIT: usize = 50;

// Server
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
