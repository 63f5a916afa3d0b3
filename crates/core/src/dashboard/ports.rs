//! Port interfaces for character data

use async_trait::async_trait;
use rda_domain::{AssetItem, CharacterLocation, Result, SkillSummary};

/// Authenticated per-character fetches
///
/// Each call stands alone; a failure affects only its own dashboard field.
#[async_trait]
pub trait CharacterData: Send + Sync {
    async fn wallet_balance(&self, character_id: i64, access_token: &str) -> Result<f64>;

    async fn skills(&self, character_id: i64, access_token: &str) -> Result<SkillSummary>;

    async fn location(&self, character_id: i64, access_token: &str) -> Result<CharacterLocation>;

    async fn assets(&self, character_id: i64, access_token: &str) -> Result<Vec<AssetItem>>;
}
