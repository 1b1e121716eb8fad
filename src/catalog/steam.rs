//! Steam Web API catalog client
//!
//! Runs a workshop text search (`IPublishedFileService/QueryFiles`) and then
//! resolves the creators of the returned files
//! (`ISteamUser/GetPlayerSummaries`).

use super::{CatalogSearch, SearchResult};
use crate::config::CatalogConfig;
use crate::error::{ModlinkerError, Result};
use crate::request::tags::tags_to_alpha;
use crate::request::SearchRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info};

/// Steam Workshop search client
#[derive(Debug, Clone)]
pub struct SteamWorkshop {
    client: Client,
    api_url: String,
    api_key: String,
    item_url: String,
    app_id: u32,
    query_type: u32,
}

#[derive(Debug, Deserialize)]
struct QueryFilesResponse {
    response: QueryFilesBody,
}

#[derive(Debug, Default, Deserialize)]
struct QueryFilesBody {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    publishedfiledetails: Vec<PublishedFile>,
}

/// A workshop file as returned by `QueryFiles`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PublishedFile {
    pub publishedfileid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub tags: Vec<FileTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileTag {
    pub tag: String,
}

#[derive(Debug, Deserialize)]
struct PlayerSummariesResponse {
    response: PlayersBody,
}

#[derive(Debug, Default, Deserialize)]
struct PlayersBody {
    #[serde(default)]
    players: Vec<Player>,
}

/// A player profile as returned by `GetPlayerSummaries`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Player {
    pub steamid: String,
    pub personaname: String,
    pub profileurl: String,
}

impl SteamWorkshop {
    /// Create a client, reading the API key from the configured environment variable
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ModlinkerError::Config(format!(
                "Environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        Self::new(config, api_key)
    }

    pub fn new(config: &CatalogConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            item_url: config.item_url.clone(),
            app_id: config.app_id,
            query_type: config.query_type,
        })
    }

    /// Query parameters for one search, built fresh for every call
    fn query_params(&self, request: &SearchRequest) -> Vec<(String, String)> {
        let app_id = self.app_id.to_string();
        let mut params = vec![
            ("key".to_string(), self.api_key.clone()),
            ("search_text".to_string(), request.query().to_string()),
            ("numperpage".to_string(), request.count().to_string()),
            ("query_type".to_string(), self.query_type.to_string()),
            ("appid".to_string(), app_id.clone()),
            ("creator_appid".to_string(), app_id),
            ("match_all_tags".to_string(), "true".to_string()),
            ("return_tags".to_string(), "true".to_string()),
            ("return_metadata".to_string(), "true".to_string()),
            ("cache_max_age_seconds".to_string(), "0".to_string()),
            ("page".to_string(), "1".to_string()),
        ];

        for (idx, tag) in request.tags().iter().enumerate() {
            params.push((format!("requiredtags[{}]", idx), tag.clone()));
        }

        params
    }

    async fn query_files(&self, request: &SearchRequest) -> Result<Vec<PublishedFile>> {
        let url = format!("{}/IPublishedFileService/QueryFiles/v1/", self.api_url);
        debug!("Querying workshop: {}", request);

        let body: QueryFilesResponse = self
            .client
            .get(&url)
            .query(&self.query_params(request))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!(
            "found {} results (of {}) for {} files matching '{}' with tags [{}]",
            body.response.publishedfiledetails.len(),
            body.response.total,
            request.count(),
            request.query(),
            request.tags().join(", ")
        );

        Ok(body.response.publishedfiledetails)
    }

    async fn player_summaries(&self, files: &[PublishedFile]) -> Result<Vec<Player>> {
        let mut creators: Vec<&str> = files.iter().map(|f| f.creator.as_str()).collect();
        creators.sort_unstable();
        creators.dedup();

        let steamids = creators.join(",");

        let url = format!("{}/ISteamUser/GetPlayerSummaries/v2/", self.api_url);
        let body: PlayerSummariesResponse = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("steamids", steamids.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body.response.players)
    }
}

#[async_trait]
impl CatalogSearch for SteamWorkshop {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let files = self.query_files(request).await?;
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let players = self.player_summaries(&files).await?;

        Ok(build_results(
            files,
            &players,
            &self.item_url,
            self.app_id,
            request.count(),
        ))
    }
}

/// Join files with their creators. Files whose creator was not returned are
/// dropped and logged.
pub(crate) fn build_results(
    files: Vec<PublishedFile>,
    players: &[Player],
    item_url: &str,
    app_id: u32,
    count: usize,
) -> Vec<SearchResult> {
    let authors: HashMap<&str, &Player> =
        players.iter().map(|p| (p.steamid.as_str(), p)).collect();

    files
        .into_iter()
        .filter_map(|file| {
            let Some(author) = authors.get(file.creator.as_str()) else {
                error!("no author found for mod {}", file.title);
                return None;
            };

            let tags: Vec<&str> = file.tags.iter().map(|t| t.tag.as_str()).collect();
            Some(SearchResult {
                url: format!("{}{}", item_url, file.publishedfileid),
                author_name: author.personaname.clone(),
                author_url: format!("{}myworkshopfiles/?appid={}", author.profileurl, app_id),
                display_alpha: tags_to_alpha(&tags),
                title: file.title,
            })
        })
        .take(count)
        .collect()
}
