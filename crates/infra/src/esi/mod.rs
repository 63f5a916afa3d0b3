//! ESI adapter
//!
//! Authenticated character endpoints and the public names endpoint. Every
//! request carries `datasource=tranquility`.

use async_trait::async_trait;
use rda_core::{CharacterData, NameLookup};
use rda_domain::constants::{ESI_DATASOURCE, MAX_NAMES_PER_REQUEST};
use rda_domain::{
    AssetItem, CharacterLocation, EsiConfig, NameRecord, RdaError, Result, SkillSummary,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct EsiClient {
    http: HttpClient,
    base_url: String,
}

impl EsiClient {
    pub fn new(config: &EsiConfig, http: HttpClient) -> Self {
        Self { http, base_url: config.base_url.trim_end_matches('/').to_string() }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .query(&[("datasource", ESI_DATASOURCE)])
    }

    async fn character_get<T: DeserializeOwned>(
        &self,
        character_id: i64,
        section: &'static str,
        access_token: &str,
    ) -> Result<T> {
        let request = self
            .request(Method::GET, &format!("/characters/{character_id}/{section}/"))
            .bearer_auth(access_token);
        self.http
            .send_json(request, section)
            .await
            .map_err(|e| RdaError::TransientFetch(format!("{section}: {e}")))
    }
}

#[async_trait]
impl CharacterData for EsiClient {
    async fn wallet_balance(&self, character_id: i64, access_token: &str) -> Result<f64> {
        self.character_get(character_id, "wallet", access_token).await
    }

    async fn skills(&self, character_id: i64, access_token: &str) -> Result<SkillSummary> {
        self.character_get(character_id, "skills", access_token).await
    }

    async fn location(&self, character_id: i64, access_token: &str) -> Result<CharacterLocation> {
        self.character_get(character_id, "location", access_token).await
    }

    async fn assets(&self, character_id: i64, access_token: &str) -> Result<Vec<AssetItem>> {
        self.character_get(character_id, "assets", access_token).await
    }
}

#[async_trait]
impl NameLookup for EsiClient {
    async fn lookup_names(&self, ids: &[i64]) -> Result<Vec<NameRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_NAMES_PER_REQUEST {
            return Err(RdaError::NameResolution(format!(
                "{} IDs exceed the per-request maximum of {MAX_NAMES_PER_REQUEST}",
                ids.len()
            )));
        }

        let request = self.request(Method::POST, "/universe/names/").json(ids);
        self.http
            .send_json(request, "names")
            .await
            .map_err(|e| RdaError::NameResolution(e.to_string()))
    }
}
