// Local comment source and reply sink: JSON lines in, replies printed out

use super::{Comment, CommentStream, PostedReply, ReplyPoster};
use crate::error::{ModlinkerError, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::Mutex;

/// Reads one JSON encoded [`Comment`] per line. Blank lines are skipped.
pub struct JsonLinesStream<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> CommentStream for JsonLinesStream<R> {
    async fn next_comment(&mut self) -> Result<Option<Comment>> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| ModlinkerError::Io {
                    source: e,
                    context: "Failed to read comment stream".to_string(),
                })?;
            self.line_no += 1;

            let Some(line) = line else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }

            let comment = serde_json::from_str(&line).map_err(|e| ModlinkerError::Json {
                source: e,
                context: format!("Invalid comment on line {}", self.line_no),
            })?;
            return Ok(Some(comment));
        }
    }
}

/// Writes each reply to an output, separated by a header line
pub struct ConsolePoster<W> {
    out: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> ConsolePoster<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ReplyPoster for ConsolePoster<W> {
    async fn post_reply(&self, comment: &Comment, body: &str) -> Result<PostedReply> {
        let mut out = self.out.lock().await;
        let text = format!("--- reply to {} by {} ---\n{}\n", comment.id, comment.author, body);

        out.write_all(text.as_bytes())
            .await
            .map_err(|e| ModlinkerError::Io {
                source: e,
                context: "Failed to write reply".to_string(),
            })?;
        out.flush().await.map_err(|e| ModlinkerError::Io {
            source: e,
            context: "Failed to flush reply".to_string(),
        })?;

        Ok(PostedReply {
            submission: comment.submission.clone(),
            permalink: None,
        })
    }
}
