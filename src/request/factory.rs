//! Request recognition using PatternRegistry
//!
//! Turns free text into search requests. Recognition never fails: text that
//! matches no template simply yields no requests.

use super::{normalize_count, ItemKind, SearchRequest, TagResolver, MAX_RESULTS};
use crate::patterns::{PatternRegistry, TemplateCapture, TemplateFamily};

/// Requests produced by one template match
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    /// Name of the template that matched
    pub pattern: &'static str,
    /// Requests built from the match (may be empty if every query was blank)
    pub requests: Vec<SearchRequest>,
}

/// Builds search requests from text
#[derive(Debug, Clone)]
pub struct RequestFactory {
    registry: PatternRegistry,
    resolver: TagResolver,
    max_results: usize,
}

impl RequestFactory {
    pub fn new(registry: PatternRegistry, resolver: TagResolver, max_results: usize) -> Self {
        Self {
            registry,
            resolver,
            max_results,
        }
    }

    /// Factory with the built-in templates and the default result cap
    pub fn with_current_version(current_version: impl Into<String>) -> crate::Result<Self> {
        Ok(Self::new(
            PatternRegistry::builtin()?,
            TagResolver::new(current_version),
            MAX_RESULTS,
        ))
    }

    /// All requests in the text, in template order then match order.
    ///
    /// Matches of different templates over the same phrase are not merged.
    pub fn parse(&self, text: &str) -> Vec<SearchRequest> {
        self.parse_matches(text)
            .into_iter()
            .flat_map(|m| m.requests)
            .collect()
    }

    /// Like [`parse`](Self::parse), grouped by the template match that produced them
    pub fn parse_matches(&self, text: &str) -> Vec<PatternMatch> {
        self.registry
            .find_captures(text)
            .into_iter()
            .map(|capture| PatternMatch {
                pattern: capture.template,
                requests: self.build(&capture),
            })
            .collect()
    }

    fn build(&self, capture: &TemplateCapture) -> Vec<SearchRequest> {
        let kind = ItemKind::from_keyword(&capture.kind);
        let version = self
            .resolver
            .resolve(capture.alpha.as_deref(), capture.version.as_deref());

        match capture.family {
            TemplateFamily::Single => {
                SearchRequest::new(kind, &capture.query, version, 1, self.max_results)
                    .into_iter()
                    .collect()
            }
            TemplateFamily::Multiple => {
                let count = normalize_count(capture.count.as_deref(), self.max_results);
                capture
                    .query
                    .split(',')
                    .filter_map(|query| {
                        SearchRequest::new(kind, query, version.clone(), count, self.max_results)
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::VersionTag;

    fn factory() -> RequestFactory {
        RequestFactory::with_current_version("1.0").unwrap()
    }

    fn queries(requests: &[SearchRequest]) -> Vec<&str> {
        requests.iter().map(|r| r.query()).collect()
    }

    #[test]
    fn test_link_mod() {
        let requests = factory().parse("linkmod: Colony Manager");

        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.is_mod());
        assert_eq!(request.query(), "Colony Manager");
        assert_eq!(request.count(), 1);
        assert_eq!(request.tags(), ["1.0".to_string(), "Mod".to_string()]);
    }

    #[test]
    fn test_there_are_count_alpha_mods() {
        let requests = factory().parse("there's 4 A17 mods for that: manager, tab, fluffy");

        assert_eq!(queries(&requests), vec!["manager", "tab", "fluffy"]);
        for request in &requests {
            assert!(request.is_mod());
            assert_eq!(request.count(), 4);
            assert_eq!(request.tags(), ["0.17".to_string(), "Mod".to_string()]);
        }
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(factory().parse("I just like this game a lot.").is_empty());
        assert!(factory().parse("").is_empty());
    }

    #[test]
    fn test_empty_queries_dropped() {
        assert!(factory().parse("linkmod :").is_empty());
        let requests = factory().parse("link mods: a, , b,");
        assert_eq!(queries(&requests), vec!["a", "b"]);
    }

    #[test]
    fn test_scenario_and_versions() {
        let requests = factory().parse("linkscenario: scenarios are for the brave");
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].is_mod());

        let requests = factory().parse("link v2.2 mod: totes!");
        assert_eq!(requests[0].version(), &VersionTag::Dotted("2.2".to_string()));

        let requests = factory().parse("there's an alpha 11 mod for that: blurb");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].version(), &VersionTag::Era(0.11));
        assert_eq!(requests[0].query(), "blurb");
    }

    #[test]
    fn test_count_clamped() {
        let requests = factory().parse("there are 20 [A14] mods for that: josephine, peter");
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.count() == MAX_RESULTS));
        assert!(requests.iter().all(|r| r.version() == &VersionTag::Era(0.14)));
    }

    #[test]
    fn test_multiple_matches_in_one_text() {
        let text = "there are multiple requests in this post. link20mods: fluffierthanthou. link20v1.0mods: mod";
        let matches = factory().parse_matches(text);

        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.pattern == "multiple:link mods"));
        assert_eq!(matches[0].requests[0].query(), "fluffierthanthou");
        assert_eq!(
            matches[1].requests[0].version(),
            &VersionTag::Dotted("1.0".to_string())
        );
        assert_eq!(matches[1].requests[0].count(), 10);
    }

    #[test]
    fn test_single_templates_come_first() {
        let text = "link mods: peter, paul. Also linkmod: timmy";
        let requests = factory().parse(text);
        assert_eq!(queries(&requests), vec!["timmy", "peter", "paul"]);
    }
}
