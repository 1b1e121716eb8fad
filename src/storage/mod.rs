//! Analytics storage for modlinker
//!
//! Records which results were shown to whom, which templates people use, and
//! which replies were posted. Also answers "did we already reply to this
//! comment?" across restarts.

pub mod database;

pub use database::{Database, DbPool, DbStats};

use crate::catalog::SearchResult;
use crate::error::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

/// A reply the bot posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord<'a> {
    pub redditor: &'a str,
    pub comment_id: &'a str,
    pub post: &'a str,
    pub submission: Option<&'a str>,
    pub permalink: Option<&'a str>,
}

impl Database {
    /// Log one result shown to a redditor
    pub fn log_result(&self, redditor: &str, result: &SearchResult) -> Result<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO requests (requesting_redditor, title, url, author, author_url, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                redditor,
                &result.title,
                &result.url,
                &result.author_name,
                &result.author_url,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Log one template match
    pub fn log_pattern(&self, redditor: &str, pattern: &str) -> Result<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO patterns (requesting_redditor, pattern, timestamp) VALUES (?1, ?2, ?3)",
            params![redditor, pattern, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Log one posted reply message
    pub fn log_post(&self, record: &PostRecord<'_>) -> Result<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO posts (requesting_redditor, comment_id, post, submission, permalink, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.redditor,
                record.comment_id,
                record.post,
                record.submission,
                record.permalink,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Whether a reply to this comment was already posted
    pub fn has_replied(&self, comment_id: &str) -> Result<bool> {
        let conn = self.get_conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM posts WHERE comment_id = ?1 LIMIT 1",
                params![comment_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Most requested results, by url
    pub fn top_results(&self, limit: usize) -> Result<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT title, COUNT(*) AS hits FROM requests
             GROUP BY url ORDER BY hits DESC, title ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: format!("https://example.com/{}", title),
            author_name: "Fluffy".to_string(),
            author_url: "https://example.com/fluffy".to_string(),
            display_alpha: None,
        }
    }

    #[test]
    fn test_log_and_count() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("analytics.db")).unwrap();

        db.log_result("alice", &result("Colony Manager")).unwrap();
        db.log_result("bob", &result("Colony Manager")).unwrap();
        db.log_result("bob", &result("Fluffy Tabs")).unwrap();
        db.log_pattern("bob", "single:link mod").unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.request_count, 3);
        assert_eq!(stats.pattern_count, 1);
        assert_eq!(stats.redditor_count, 2);

        let top = db.top_results(1).unwrap();
        assert_eq!(top, vec![("Colony Manager".to_string(), 2)]);
    }

    #[test]
    fn test_has_replied() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("analytics.db")).unwrap();

        assert!(!db.has_replied("c1").unwrap());

        db.log_post(&PostRecord {
            redditor: "alice",
            comment_id: "c1",
            post: "reply body",
            submission: Some("A thread"),
            permalink: None,
        })
        .unwrap();

        assert!(db.has_replied("c1").unwrap());
        assert!(!db.has_replied("c2").unwrap());
        assert_eq!(db.stats().unwrap().post_count, 1);
    }
}
