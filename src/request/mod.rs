//! Search requests recognized in comments
//!
//! A [`SearchRequest`] is built once, either by the [`RequestFactory`] from a
//! template match or by [`SearchRequest::from_free_text`], and never mutated.

mod factory;
pub mod tags;

pub use factory::{PatternMatch, RequestFactory};
pub use tags::{TagResolver, VersionTag};

use serde::Serialize;
use std::fmt;

/// Upper bound on results per request
pub const MAX_RESULTS: usize = 10;

/// What kind of workshop item a request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemKind {
    Mod,
    Scenario,
}

impl ItemKind {
    /// Map a captured type keyword (`mod`, `Scenario`, ...) to a kind
    pub fn from_keyword(keyword: &str) -> Self {
        if keyword.eq_ignore_ascii_case("mod") {
            ItemKind::Mod
        } else {
            ItemKind::Scenario
        }
    }

    /// Catalog tag for this kind
    pub fn tag(&self) -> &'static str {
        match self {
            ItemKind::Mod => "Mod",
            ItemKind::Scenario => "Scenario",
        }
    }
}

/// A normalized request for catalog results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    kind: ItemKind,
    query: String,
    count: usize,
    version: VersionTag,
}

impl SearchRequest {
    /// Build a request, clamping `count` into `1..=max_results`.
    ///
    /// Returns `None` when the query is empty after trimming.
    pub fn new(
        kind: ItemKind,
        query: &str,
        version: VersionTag,
        count: usize,
        max_results: usize,
    ) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        Some(Self {
            kind,
            query: query.to_string(),
            count: count.clamp(1, max_results.max(1)),
            version,
        })
    }

    /// Build a mod request for a bare query string at the current version
    pub fn from_free_text(
        query: &str,
        count: usize,
        resolver: &TagResolver,
        max_results: usize,
    ) -> Option<Self> {
        Self::new(ItemKind::Mod, query, resolver.current(), count, max_results)
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn is_mod(&self) -> bool {
        self.kind == ItemKind::Mod
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn version(&self) -> &VersionTag {
        &self.version
    }

    /// Required catalog tags: version tag first, then the item kind
    pub fn tags(&self) -> [String; 2] {
        [self.version.as_tag(), self.kind.tag().to_string()]
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Request for {} [{}] matching {}",
            self.count,
            self.tags().join(", "),
            self.query
        )
    }
}

/// Serializable view of a request, used for `--json` output
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub is_mod: bool,
    pub query: String,
    pub count: usize,
    pub tags: Vec<String>,
}

impl From<&SearchRequest> for RequestSummary {
    fn from(request: &SearchRequest) -> Self {
        Self {
            is_mod: request.is_mod(),
            query: request.query.clone(),
            count: request.count,
            tags: request.tags().to_vec(),
        }
    }
}

/// Normalize a captured count: absent or non-numeric is 1, then clamp into
/// `1..=max_results`. Digit strings too long for `usize` saturate.
pub fn normalize_count(captured: Option<&str>, max_results: usize) -> usize {
    let count = match captured.map(str::trim) {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse::<usize>().unwrap_or(usize::MAX)
        }
        _ => 1,
    };
    count.clamp(1, max_results.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TagResolver {
        TagResolver::new("1.0")
    }

    #[test]
    fn test_normalize_count_range() {
        for c in 0..100usize {
            let n = normalize_count(Some(&c.to_string()), MAX_RESULTS);
            assert!((1..=MAX_RESULTS).contains(&n));
            if c >= MAX_RESULTS {
                assert_eq!(n, MAX_RESULTS);
            }
        }
    }

    #[test]
    fn test_normalize_count_defaults() {
        assert_eq!(normalize_count(None, MAX_RESULTS), 1);
        assert_eq!(normalize_count(Some("four"), MAX_RESULTS), 1);
        assert_eq!(normalize_count(Some("99999999999999999999999"), MAX_RESULTS), 10);
        assert_eq!(normalize_count(Some("-3"), MAX_RESULTS), 1);
        assert_eq!(normalize_count(Some("4"), MAX_RESULTS), 4);
        assert_eq!(normalize_count(Some("20"), MAX_RESULTS), 10);
    }

    #[test]
    fn test_request_trims_and_rejects_empty() {
        let request =
            SearchRequest::new(ItemKind::Mod, "  Colony Manager ", resolver().current(), 1, 10)
                .unwrap();
        assert_eq!(request.query(), "Colony Manager");

        assert!(SearchRequest::new(ItemKind::Mod, "   ", resolver().current(), 1, 10).is_none());
    }

    #[test]
    fn test_request_clamps_count() {
        let request =
            SearchRequest::new(ItemKind::Scenario, "boris", resolver().current(), 50, 10).unwrap();
        assert_eq!(request.count(), 10);

        let request =
            SearchRequest::new(ItemKind::Scenario, "boris", resolver().current(), 0, 10).unwrap();
        assert_eq!(request.count(), 1);
    }

    #[test]
    fn test_tags_order() {
        let request =
            SearchRequest::new(ItemKind::Scenario, "boris", VersionTag::Era(0.17), 1, 10).unwrap();
        assert_eq!(request.tags(), ["0.17".to_string(), "Scenario".to_string()]);
        assert!(!request.is_mod());
    }

    #[test]
    fn test_from_free_text() {
        let request = SearchRequest::from_free_text("Pawns are Capable!", 5, &resolver(), 10)
            .unwrap();
        assert!(request.is_mod());
        assert_eq!(request.count(), 5);
        assert_eq!(request.tags(), ["1.0".to_string(), "Mod".to_string()]);
        assert_eq!(
            request.to_string(),
            "Request for 5 [1.0, Mod] matching Pawns are Capable!"
        );
    }

    #[test]
    fn test_item_kind_keyword() {
        assert_eq!(ItemKind::from_keyword("MOD"), ItemKind::Mod);
        assert_eq!(ItemKind::from_keyword("Scenario"), ItemKind::Scenario);
    }
}
