//! Catalog search boundary
//!
//! The catalog is the Steam Workshop. [`CatalogSearch`] is the single entry
//! point: it always takes a [`SearchRequest`] and answers with a possibly
//! empty list of [`SearchResult`]s.

mod steam;

pub use steam::SteamWorkshop;

use crate::config::CatalogConfig;
use crate::error::{ModlinkerError, Result};
use crate::request::SearchRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// One catalog item, with its author resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub author_name: String,
    pub author_url: String,
    /// Display label of the item's version tag (`A17`, `B18`, `1.0`)
    pub display_alpha: Option<String>,
}

/// A source of search results
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Results for the request, best match first, at most `request.count()` long
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>>;
}

/// Builds human-facing links into the workshop
#[derive(Debug, Clone)]
pub struct WorkshopLinks {
    browse_url: String,
    app_id: u32,
}

impl WorkshopLinks {
    pub fn new(browse_url: impl Into<String>, app_id: u32) -> Self {
        Self {
            browse_url: browse_url.into(),
            app_id,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(config.browse_url.clone(), config.app_id)
    }

    /// Browse page showing the same search the bot ran
    pub fn browse_url(&self, request: &SearchRequest) -> Result<String> {
        let app_id = self.app_id.to_string();
        let [version_tag, kind_tag] = request.tags();
        let params = [
            ("appid", app_id.as_str()),
            ("browsesort", "textsearch"),
            ("requiredtags[]", version_tag.as_str()),
            ("requiredtags[]", kind_tag.as_str()),
            ("searchtext", request.query()),
        ];

        Url::parse_with_params(&self.browse_url, &params)
            .map(String::from)
            .map_err(|e| {
                ModlinkerError::Config(format!(
                    "Invalid browse url '{}': {}",
                    self.browse_url, e
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ItemKind, VersionTag};

    #[test]
    fn test_browse_url_carries_tags_and_query() {
        let links = WorkshopLinks::new("https://steamcommunity.com/workshop/browse/", 294100);
        let request =
            SearchRequest::new(ItemKind::Mod, "Colony Manager", VersionTag::Era(0.18), 3, 10)
                .unwrap();

        let url = links.browse_url(&request).unwrap();
        assert!(url.starts_with("https://steamcommunity.com/workshop/browse/?appid=294100"));
        assert!(url.contains("browsesort=textsearch"));
        assert!(url.contains("requiredtags%5B%5D=0.18"));
        assert!(url.contains("requiredtags%5B%5D=Mod"));
        assert!(url.ends_with("searchtext=Colony+Manager"));
    }

    #[test]
    fn test_invalid_browse_url() {
        let links = WorkshopLinks::new("not a url", 294100);
        let request =
            SearchRequest::new(ItemKind::Mod, "x", VersionTag::Era(0.18), 1, 10).unwrap();
        assert!(links.browse_url(&request).is_err());
    }
}
