//! SQLite database management with migrations
//!
//! Provides the analytics tables: requested results, matched patterns and
//! posted replies.

use crate::error::{ModlinkerError, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

/// Database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database manager with migration support
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) the database at `db_path`
    pub fn new(db_path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModlinkerError::Io {
                source: e,
                context: format!("Failed to create database directory: {:?}", parent),
            })?;
        }

        let manager = SqliteConnectionManager::file(db_path);

        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| ModlinkerError::Storage(format!("Failed to create connection pool: {}", e)))?;

        {
            let conn = pool
                .get()
                .map_err(|e| ModlinkerError::Storage(format!("Failed to get connection: {}", e)))?;

            // WAL lets the stats command read while the bot writes
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA busy_timeout = 5000;
                ",
            )?;
        }

        let db = Self { pool };

        db.migrate()?;

        Ok(db)
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| ModlinkerError::Storage(format!("Failed to get connection: {}", e)))
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM _migrations",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for (version, migration) in MIGRATIONS.iter().enumerate() {
            let version = version as i32 + 1;

            if version > current_version {
                tracing::info!("Applying migration {}", version);

                conn.execute_batch(migration)?;

                conn.execute(
                    "INSERT INTO _migrations (version, applied_at) VALUES (?1, datetime('now'))",
                    params![version],
                )?;
            }
        }

        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let conn = self.get_conn()?;

        let request_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM requests", [], |row| row.get(0))?;

        let pattern_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM patterns", [], |row| row.get(0))?;

        let post_count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;

        let redditor_count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT requesting_redditor) FROM requests",
            [],
            |row| row.get(0),
        )?;

        Ok(DbStats {
            request_count: request_count as usize,
            pattern_count: pattern_count as usize,
            post_count: post_count as usize,
            redditor_count: redditor_count as usize,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStats {
    pub request_count: usize,
    pub pattern_count: usize,
    pub post_count: usize,
    pub redditor_count: usize,
}

/// Database migrations (each string is one migration)
const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    -- One row per result shown to a redditor
    CREATE TABLE requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        requesting_redditor TEXT NOT NULL,
        title TEXT NOT NULL,
        url TEXT NOT NULL,
        author TEXT NOT NULL,
        author_url TEXT NOT NULL,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX idx_requests_redditor ON requests(requesting_redditor);
    CREATE INDEX idx_requests_url ON requests(url);

    -- One row per template match
    CREATE TABLE patterns (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        requesting_redditor TEXT NOT NULL,
        pattern TEXT NOT NULL,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX idx_patterns_pattern ON patterns(pattern);

    -- One row per reply message posted
    CREATE TABLE posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        requesting_redditor TEXT NOT NULL,
        comment_id TEXT NOT NULL,
        post TEXT NOT NULL,
        submission TEXT,
        permalink TEXT,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX idx_posts_comment ON posts(comment_id);
    "#,
];
