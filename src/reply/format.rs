//! Rendering of one request's results into a reply block

use crate::catalog::{SearchResult, WorkshopLinks};
use crate::error::Result;
use crate::request::SearchRequest;

/// Renders result lists as reddit markdown
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    links: WorkshopLinks,
}

impl ResultFormatter {
    pub fn new(links: WorkshopLinks) -> Self {
        Self { links }
    }

    /// Render the results of one request.
    ///
    /// Only the first `request.count()` results are shown; the layout is
    /// picked from the number actually shown.
    pub fn format(&self, request: &SearchRequest, results: &[SearchResult]) -> Result<String> {
        let request_url = self.links.browse_url(request)?;
        let shown = &results[..results.len().min(request.count())];

        let block = match shown {
            [] => format!(
                "Sorry, but a search for [`{}`]({}) gave no results.",
                request.query(),
                request_url
            ),
            [result] => format!(
                "{}[{}]({}) by [{}]({})\n\n^(Results for) [^(`{}`)]({})^(. I'm showing you the top result, there may be more.)",
                alpha_prefix(result),
                result.title,
                result.url,
                result.author_name,
                result.author_url,
                request.query(),
                request_url
            ),
            _ => {
                let mut table = String::from("Mod | Author \n :-|-: \n");
                for result in shown {
                    table.push_str(&format!(
                        "{}[{}]({}) | by [{}]({})\n",
                        alpha_prefix(result),
                        result.title,
                        result.url,
                        result.author_name,
                        result.author_url
                    ));
                }
                table.push_str(&format!(
                    "\n\n^(Results for ) [^(`{}`)]({})^(. I'm showing you the top {} results, there may be more.)",
                    request.query(),
                    request_url,
                    shown.len()
                ));
                table
            }
        };

        tracing::debug!("{}", block);
        Ok(block)
    }
}

fn alpha_prefix(result: &SearchResult) -> String {
    result
        .display_alpha
        .as_ref()
        .map(|alpha| format!("[{}] ", alpha))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ItemKind, VersionTag};

    fn formatter() -> ResultFormatter {
        ResultFormatter::new(WorkshopLinks::new(
            "https://steamcommunity.com/workshop/browse/",
            294100,
        ))
    }

    fn request(count: usize) -> SearchRequest {
        SearchRequest::new(ItemKind::Mod, "manager", VersionTag::Era(0.18), count, 10).unwrap()
    }

    fn result(title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: format!("https://example.com/{}", title),
            author_name: "Fluffy".to_string(),
            author_url: "https://example.com/fluffy".to_string(),
            display_alpha: Some("B18".to_string()),
        }
    }

    #[test]
    fn test_no_results_apologizes() {
        let block = formatter().format(&request(3), &[]).unwrap();
        assert!(block.starts_with("Sorry, but a search for [`manager`](https://steamcommunity.com/workshop/browse/?"));
        assert!(block.ends_with(") gave no results."));
    }

    #[test]
    fn test_single_result_line() {
        let block = formatter().format(&request(1), &[result("Colony")]).unwrap();
        assert!(block.starts_with(
            "[B18] [Colony](https://example.com/Colony) by [Fluffy](https://example.com/fluffy)\n\n"
        ));
        assert!(block.contains("top result"));
        assert!(!block.contains("Mod | Author"));
    }

    #[test]
    fn test_table_for_many_results() {
        let results = vec![result("A"), result("B"), result("C")];
        let block = formatter().format(&request(3), &results).unwrap();

        assert!(block.starts_with("Mod | Author \n :-|-: \n"));
        assert!(block.contains("[B18] [A](https://example.com/A) | by [Fluffy](https://example.com/fluffy)\n"));
        assert!(block.contains("[C](https://example.com/C)"));
        assert!(block.contains("top 3 results"));
    }

    #[test]
    fn test_results_beyond_count_not_rendered() {
        let results = vec![result("A"), result("B"), result("C")];

        let block = formatter().format(&request(2), &results).unwrap();
        assert!(block.contains("top 2 results"));
        assert!(!block.contains("[C]"));

        let block = formatter().format(&request(1), &results).unwrap();
        assert!(block.contains("top result"));
        assert!(!block.contains("[B]"));
    }

    #[test]
    fn test_missing_alpha_has_no_prefix() {
        let mut single = result("Colony");
        single.display_alpha = None;
        let block = formatter().format(&request(1), &[single]).unwrap();
        assert!(block.starts_with("[Colony]("));
    }
}
