// Bot module: reads comments, answers link requests, records analytics

mod io;
mod signals;

pub use io::{ConsolePoster, JsonLinesStream};
pub use signals::SignalHandler;

use crate::catalog::{CatalogSearch, WorkshopLinks};
use crate::config::Config;
use crate::error::{ModlinkerError, Result};
use crate::patterns::PatternRegistry;
use crate::reply::{ReplyAssembler, ResultFormatter};
use crate::request::{RequestFactory, TagResolver};
use crate::storage::{Database, PostRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

/// A comment to inspect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: String,
    /// Title of the thread the comment was made in
    #[serde(default)]
    pub submission: Option<String>,
}

/// Where replies ended up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedReply {
    pub submission: Option<String>,
    pub permalink: Option<String>,
}

/// A source of comments, read one at a time
#[async_trait]
pub trait CommentStream: Send {
    /// Next comment, or `None` when the stream is exhausted
    async fn next_comment(&mut self) -> Result<Option<Comment>>;
}

/// Posts replies to comments
#[async_trait]
pub trait ReplyPoster: Send + Sync {
    /// Post one reply. Return [`ModlinkerError::RateLimited`] to have the bot
    /// back off and retry.
    async fn post_reply(&self, comment: &Comment, body: &str) -> Result<PostedReply>;

    /// Whether the bot already has a reply under this comment
    async fn has_reply_by(&self, _comment: &Comment, _username: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Why a comment got no reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OwnComment,
    NoRequests,
    AlreadyReplied,
    NothingToSay,
}

/// What happened to one comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    Skipped(SkipReason),
    Replied { requests: usize, messages: usize },
}

/// Per-run counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub comments: u64,
    pub replied: u64,
    pub errors: u64,
}

/// The link bot: recognition, search, formatting and posting for one comment
/// at a time
pub struct Bot<C, P> {
    factory: RequestFactory,
    formatter: ResultFormatter,
    assembler: ReplyAssembler,
    catalog: C,
    poster: P,
    database: Database,
    username: String,
    ratelimit_backoff: Duration,
    max_post_attempts: u32,
}

impl<C: CatalogSearch, P: ReplyPoster> Bot<C, P> {
    /// Create a bot from configuration
    pub fn new(config: &Config, catalog: C, poster: P, database: Database) -> Result<Self> {
        let factory = RequestFactory::new(
            PatternRegistry::builtin()?,
            TagResolver::new(config.linker.current_version.clone()),
            config.linker.max_results,
        );

        Ok(Self {
            factory,
            formatter: ResultFormatter::new(WorkshopLinks::from_config(&config.catalog)),
            assembler: ReplyAssembler::new(config.linker.max_length, config.linker.footer.clone()),
            catalog,
            poster,
            database,
            username: config.bot.username.clone(),
            ratelimit_backoff: config.bot.ratelimit_backoff(),
            max_post_attempts: config.bot.max_post_attempts,
        })
    }

    pub fn poster(&self) -> &P {
        &self.poster
    }

    /// Handle comments until the stream ends or a shutdown signal arrives
    pub async fn run<S: CommentStream>(&self, stream: S) -> Result<RunStats> {
        let mut signal_handler = SignalHandler::new()?;
        let shutdown = async move {
            let sig = signal_handler.wait().await;
            tracing::info!("Shutdown signal received ({})", sig);
        };

        Ok(self.run_until(stream, shutdown).await)
    }

    /// Handle comments until the stream ends or `shutdown` completes.
    ///
    /// A comment already being handled is finished before shutdown is noticed.
    pub async fn run_until<S, F>(&self, mut stream: S, shutdown: F) -> RunStats
    where
        S: CommentStream,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = RunStats::default();

        tracing::info!("Bot started as {}", self.username);

        loop {
            tokio::select! {
                next = stream.next_comment() => {
                    let comment = match next {
                        Ok(Some(comment)) => comment,
                        Ok(None) => {
                            tracing::info!("Comment stream ended");
                            break;
                        }
                        Err(e) => {
                            tracing::error!("Failed to read comment: {}", e);
                            stats.errors += 1;
                            continue;
                        }
                    };

                    stats.comments += 1;
                    match self.process_comment(&comment).await {
                        Ok(CommentOutcome::Replied { .. }) => stats.replied += 1,
                        Ok(CommentOutcome::Skipped(_)) => {}
                        Err(e) => {
                            tracing::error!("Failed to handle comment {}: {}", comment.id, e);
                            stats.errors += 1;
                        }
                    }
                }

                _ = &mut shutdown => {
                    break;
                }
            }
        }

        tracing::info!(
            "Bot finished: {} comments, {} replied, {} errors",
            stats.comments,
            stats.replied,
            stats.errors
        );

        stats
    }

    /// Handle one comment: parse, search, format, assemble, post, log
    pub async fn process_comment(&self, comment: &Comment) -> Result<CommentOutcome> {
        tracing::info!("new comment :: {}", comment.id);
        tracing::debug!("{}", comment.body);

        if comment.author.eq_ignore_ascii_case(&self.username) {
            tracing::info!("comment made by me, skipping");
            return Ok(CommentOutcome::Skipped(SkipReason::OwnComment));
        }

        let matches = self.factory.parse_matches(&comment.body);
        let requests: Vec<_> = matches.iter().flat_map(|m| m.requests.iter()).collect();
        if requests.is_empty() {
            tracing::info!("no requests, skipping");
            return Ok(CommentOutcome::Skipped(SkipReason::NoRequests));
        }

        if self.database.has_replied(&comment.id)?
            || self.poster.has_reply_by(comment, &self.username).await?
        {
            tracing::info!("already replied to comment, skipping");
            return Ok(CommentOutcome::Skipped(SkipReason::AlreadyReplied));
        }

        let mut blocks = VecDeque::with_capacity(requests.len());
        for request in &requests {
            tracing::info!("{}", request);

            let results = match self.catalog.search(request).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::error!("Search failed for '{}': {}", request.query(), e);
                    continue;
                }
            };

            blocks.push_back(self.formatter.format(request, &results)?);

            for result in &results {
                if let Err(e) = self.database.log_result(&comment.author, result) {
                    tracing::error!("Failed to log result: {}", e);
                }
            }
        }

        for m in &matches {
            if let Err(e) = self.database.log_pattern(&comment.author, m.pattern) {
                tracing::error!("Failed to log pattern: {}", e);
            }
        }

        let messages = self.assembler.assemble(&mut blocks);
        if messages.is_empty() {
            tracing::warn!("nothing to reply to {}", comment.id);
            return Ok(CommentOutcome::Skipped(SkipReason::NothingToSay));
        }

        for (index, message) in messages.iter().enumerate() {
            tracing::debug!("reply {}: \n{}", index, message);
            let posted = self.post_with_backoff(comment, message).await?;

            let record = PostRecord {
                redditor: &comment.author,
                comment_id: &comment.id,
                post: message,
                submission: posted.submission.as_deref(),
                permalink: posted.permalink.as_deref(),
            };
            if let Err(e) = self.database.log_post(&record) {
                tracing::error!("Failed to log post: {}", e);
            }

            tracing::info!(
                "replied to {} ({}/{}): {}",
                comment.id,
                index + 1,
                messages.len(),
                posted.permalink.as_deref().unwrap_or("-")
            );
        }

        tracing::info!("Successfully handled comment {}", comment.id);

        Ok(CommentOutcome::Replied {
            requests: requests.len(),
            messages: messages.len(),
        })
    }

    /// Post a reply, sleeping and retrying while the poster reports rate limiting
    async fn post_with_backoff(&self, comment: &Comment, body: &str) -> Result<PostedReply> {
        let mut attempt = 1;
        loop {
            match self.poster.post_reply(comment, body).await {
                Err(ModlinkerError::RateLimited { retry_after }) if attempt < self.max_post_attempts => {
                    let wait = retry_after.unwrap_or(self.ratelimit_backoff);
                    tracing::warn!(
                        "rate limit exceeded (attempt {}/{}), sleeping for {:?}",
                        attempt,
                        self.max_post_attempts,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SearchResult;
    use crate::request::SearchRequest;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeCatalog;

    #[async_trait]
    impl CatalogSearch for FakeCatalog {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
            if request.query() == "broken" {
                return Err(ModlinkerError::Catalog("boom".to_string()));
            }
            Ok(vec![SearchResult {
                title: format!("{} Mod", request.query()),
                url: "https://example.com/item".to_string(),
                author_name: "Fluffy".to_string(),
                author_url: "https://example.com/fluffy".to_string(),
                display_alpha: Some("1.0".to_string()),
            }])
        }
    }

    #[derive(Default)]
    struct FakePoster {
        posted: Mutex<Vec<String>>,
        rate_limits: AtomicU32,
    }

    #[async_trait]
    impl ReplyPoster for FakePoster {
        async fn post_reply(&self, _comment: &Comment, body: &str) -> Result<PostedReply> {
            if self.rate_limits.load(Ordering::SeqCst) > 0 {
                self.rate_limits.fetch_sub(1, Ordering::SeqCst);
                return Err(ModlinkerError::RateLimited {
                    retry_after: Some(Duration::from_millis(1)),
                });
            }
            self.posted.lock().unwrap().push(body.to_string());
            Ok(PostedReply {
                submission: None,
                permalink: Some("https://example.com/reply".to_string()),
            })
        }
    }

    fn comment(id: &str, author: &str, body: &str) -> Comment {
        Comment {
            id: id.to_string(),
            author: author.to_string(),
            body: body.to_string(),
            submission: None,
        }
    }

    fn bot(temp_dir: &TempDir, poster: FakePoster) -> Bot<FakeCatalog, FakePoster> {
        let config = Config::default();
        let database = Database::new(&temp_dir.path().join("analytics.db")).unwrap();
        Bot::new(&config, FakeCatalog, poster, database).unwrap()
    }

    #[tokio::test]
    async fn test_replies_and_logs() {
        let temp_dir = TempDir::new().unwrap();
        let bot = bot(&temp_dir, FakePoster::default());

        let outcome = bot
            .process_comment(&comment("c1", "alice", "linkmod: Colony Manager"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommentOutcome::Replied {
                requests: 1,
                messages: 1
            }
        );

        let posted = bot.poster().posted.lock().unwrap().clone();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].starts_with("[1.0] [Colony Manager Mod]"));

        let stats = bot.database.stats().unwrap();
        assert_eq!(stats.request_count, 1);
        assert_eq!(stats.pattern_count, 1);
        assert_eq!(stats.post_count, 1);
        assert!(bot.database.has_replied("c1").unwrap());
    }

    #[tokio::test]
    async fn test_skips() {
        let temp_dir = TempDir::new().unwrap();
        let bot = bot(&temp_dir, FakePoster::default());

        let own = bot
            .process_comment(&comment("c1", "modlinkerbot", "linkmod: x"))
            .await
            .unwrap();
        assert_eq!(own, CommentOutcome::Skipped(SkipReason::OwnComment));

        let nothing = bot
            .process_comment(&comment("c2", "alice", "just chatting"))
            .await
            .unwrap();
        assert_eq!(nothing, CommentOutcome::Skipped(SkipReason::NoRequests));

        bot.process_comment(&comment("c3", "alice", "linkmod: x"))
            .await
            .unwrap();
        let again = bot
            .process_comment(&comment("c3", "alice", "linkmod: x"))
            .await
            .unwrap();
        assert_eq!(again, CommentOutcome::Skipped(SkipReason::AlreadyReplied));
    }

    #[tokio::test]
    async fn test_failed_search_skips_request() {
        let temp_dir = TempDir::new().unwrap();
        let bot = bot(&temp_dir, FakePoster::default());

        let outcome = bot
            .process_comment(&comment("c1", "alice", "link mods: broken, Fluffy Tabs"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommentOutcome::Replied {
                requests: 2,
                messages: 1
            }
        );

        let posted = bot.poster().posted.lock().unwrap().clone();
        assert!(posted[0].contains("Fluffy Tabs Mod"));
        assert!(!posted[0].contains("broken Mod"));
    }

    #[tokio::test]
    async fn test_all_searches_failed() {
        let temp_dir = TempDir::new().unwrap();
        let bot = bot(&temp_dir, FakePoster::default());

        let outcome = bot
            .process_comment(&comment("c1", "alice", "linkmod: broken"))
            .await
            .unwrap();
        assert_eq!(outcome, CommentOutcome::Skipped(SkipReason::NothingToSay));
        assert!(bot.poster().posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_retry() {
        let temp_dir = TempDir::new().unwrap();
        let poster = FakePoster::default();
        poster.rate_limits.store(2, Ordering::SeqCst);
        let bot = bot(&temp_dir, poster);

        bot.process_comment(&comment("c1", "alice", "linkmod: x"))
            .await
            .unwrap();
        assert_eq!(bot.poster().posted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up() {
        let temp_dir = TempDir::new().unwrap();
        let poster = FakePoster::default();
        poster.rate_limits.store(100, Ordering::SeqCst);
        let bot = bot(&temp_dir, poster);

        let result = bot
            .process_comment(&comment("c1", "alice", "linkmod: x"))
            .await;
        assert!(matches!(result, Err(ModlinkerError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_stops_waiting_stream() {
        let temp_dir = TempDir::new().unwrap();
        let bot = bot(&temp_dir, FakePoster::default());

        // Writer stays open, so the stream never ends on its own
        let (_writer, reader) = tokio::io::duplex(64);
        let stream = JsonLinesStream::new(tokio::io::BufReader::new(reader));

        let stats = tokio::time::timeout(
            Duration::from_secs(5),
            bot.run_until(stream, tokio::time::sleep(Duration::from_millis(10))),
        )
        .await
        .expect("run loop ignored shutdown");

        assert_eq!(stats, RunStats::default());
    }

    #[tokio::test]
    async fn test_run_until_stream_ends() {
        let temp_dir = TempDir::new().unwrap();
        let bot = bot(&temp_dir, FakePoster::default());

        let input = b"{\"id\": \"c1\", \"author\": \"alice\", \"body\": \"linkmod: x\"}\n\
{\"id\": \"c2\", \"author\": \"bob\", \"body\": \"nothing here\"}\n";
        let stats = bot.run(JsonLinesStream::new(&input[..])).await.unwrap();

        assert_eq!(
            stats,
            RunStats {
                comments: 2,
                replied: 1,
                errors: 0
            }
        );
    }
}
