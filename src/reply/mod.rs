//! Reply construction: rendering result blocks and packing them into messages

mod assemble;
mod format;

pub use assemble::{ReplyAssembler, MAX_LENGTH};
pub use format::ResultFormatter;

/// Default footer appended to every reply
pub const DEFAULT_FOOTER: &str = "\n\n*****\n\
^I'm&#32;a&#32;bot&#32;|&#32;[source](https://github.com/FluffierThanThou/reddit-modlinker)\
&#32;|&#32;[commands](https://github.com/FluffierThanThou/reddit-modlinker/blob/master/bot/COMMANDS.MD)\
&#32;|&#32;I&#32;was&#32;made&#32;by&#32;[/u\\/FluffierThanThou](/user/FluffierThanThou)";
