//! Legacy `<txp:...>` tag handling

pub mod parser;
pub mod rewrite;

// Re-export main types
pub use parser::{scan, Attributes, CustomTag, Segment, TagKind, TagParseError};
pub use rewrite::{AssetSink, RewriteResult, RewriteStats, Rewritten, SkipReason, TagRewriter};
