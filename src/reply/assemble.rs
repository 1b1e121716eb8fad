//! Packing reply blocks into size-bounded messages

use std::collections::VecDeque;
use tracing::{debug, warn};

/// Hard cap on a reply, footer included (reddit allows 10000)
pub const MAX_LENGTH: usize = 9900;

/// Separator placed between blocks of one message
const SEPARATOR: &str = "\n\n";

/// Greedy, order-preserving packer of blocks into messages
#[derive(Debug, Clone)]
pub struct ReplyAssembler {
    max_length: usize,
    footer: String,
    footer_len: usize,
}

impl ReplyAssembler {
    pub fn new(max_length: usize, footer: impl Into<String>) -> Self {
        let footer = footer.into();
        Self {
            max_length,
            footer_len: char_len(&footer),
            footer,
        }
    }

    /// Drain the queue into messages, each ending with the footer.
    ///
    /// Blocks keep their order and are never split. A block that would not
    /// fit even in an empty message is dropped.
    pub fn assemble(&self, blocks: &mut VecDeque<String>) -> Vec<String> {
        let mut messages = Vec::new();
        let mut reply = String::new();
        let mut reply_len = 0;

        while let Some(block) = blocks.front() {
            let block_len = char_len(block);
            let separator_len = if reply.is_empty() { 0 } else { SEPARATOR.len() };

            if block_len + separator_len + reply_len + self.footer_len <= self.max_length {
                let Some(block) = blocks.pop_front() else {
                    break;
                };
                if !reply.is_empty() {
                    reply.push_str(SEPARATOR);
                }
                reply.push_str(&block);
                reply_len += separator_len + block_len;
            } else if block_len + self.footer_len > self.max_length {
                warn!(
                    "comment too long ({}/{}), skipping",
                    block_len + self.footer_len,
                    self.max_length
                );
                if let Some(block) = blocks.pop_front() {
                    debug!("{}", block);
                }
            } else {
                messages.push(self.finish(std::mem::take(&mut reply)));
                reply_len = 0;
            }
        }

        if !reply.is_empty() {
            messages.push(self.finish(reply));
        }

        messages
    }

    fn finish(&self, mut reply: String) -> String {
        reply.push_str(&self.footer);
        reply
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
