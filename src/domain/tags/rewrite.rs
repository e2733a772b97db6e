//! Rewriting image tags into HTML `<img>` elements

use crate::domain::media::{MediaLookup, MediaRecord, MediaRef, ReferenceError, UnsafeMediaName};
use crate::domain::tags::parser::{scan, CustomTag, Segment, TagParseError};
use crate::error::{MigrateError, Result};
use std::ops::AddAssign;
use thiserror::Error;
use tracing::{debug, warn};

/// Attributes consumed by the migration instead of being copied to `<img>`
pub const IGNORED_ATTRIBUTES: [&str; 6] = ["thumbnail", "name", "id", "escape", "wraptag", "html_id"];

/// Copies legacy image files into the site
pub trait AssetSink {
    /// Copy `source_name` from the legacy image directory to `dest_name` in
    /// the site's image directory. Returns `false` when the source file does
    /// not exist. An `Io` error only fails the tag being rewritten.
    fn relocate(&self, source_name: &str, dest_name: &str) -> Result<bool>;
}

/// Why a recognized tag was left as it was
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("{0}")]
    Parse(#[from] TagParseError),
    #[error("{0}")]
    Reference(#[from] ReferenceError),
    #[error("no media record with {0}")]
    MediaNotFound(MediaRef),
    #[error("{0}")]
    UnsafeName(#[from] UnsafeMediaName),
    #[error("image file not found: {0}")]
    SourceMissing(String),
    #[error("could not copy image: {0}")]
    CopyFailed(String),
}

/// Result of rewriting one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResult {
    Replaced(String),
    Unchanged(SkipReason),
}

/// Tag counters for one body (or a whole run, when summed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub rewritten: usize,
    pub unrecognized: usize,
    pub failed: usize,
}

impl AddAssign for RewriteStats {
    fn add_assign(&mut self, other: Self) {
        self.rewritten += other.rewritten;
        self.unrecognized += other.unrecognized;
        self.failed += other.failed;
    }
}

/// A rewritten body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    pub stats: RewriteStats,
}

pub struct TagRewriter<'a> {
    lookup: &'a dyn MediaLookup,
    assets: &'a dyn AssetSink,
    image_base_url: &'a str,
    images_dir: &'a str,
}

impl<'a> TagRewriter<'a> {
    /// `image_base_url` and `images_dir` are joined into the `src` prefix,
    /// e.g. `/` and `images/import` give `/images/import/<file>`.
    pub fn new(
        lookup: &'a dyn MediaLookup,
        assets: &'a dyn AssetSink,
        image_base_url: &'a str,
        images_dir: &'a str,
    ) -> Self {
        TagRewriter {
            lookup,
            assets,
            image_base_url,
            images_dir,
        }
    }

    /// Rewrite every image tag in `body`.
    ///
    /// Tags that can't be rewritten are kept verbatim; only lookup and copy
    /// errors from the collaborators are returned as `Err`.
    pub fn rewrite(&self, body: &str) -> Result<Rewritten> {
        let mut text = String::with_capacity(body.len());
        let mut stats = RewriteStats::default();

        for segment in scan(body) {
            match segment {
                Segment::Text(t) => text.push_str(t),
                Segment::Unrecognized { name, raw } => {
                    debug!(tag = name, "leaving unrecognized tag unchanged");
                    stats.unrecognized += 1;
                    text.push_str(raw);
                }
                Segment::Invalid { raw, error } => {
                    let reason = SkipReason::from(error);
                    warn!(tag = raw, "Failed to parse image tag: {}", reason);
                    stats.failed += 1;
                    text.push_str(raw);
                }
                Segment::Tag(tag) => match self.rewrite_tag(&tag)? {
                    RewriteResult::Replaced(html) => {
                        stats.rewritten += 1;
                        text.push_str(&html);
                    }
                    RewriteResult::Unchanged(reason) => {
                        warn!(tag = tag.raw, "Failed to convert image tag: {}", reason);
                        stats.failed += 1;
                        text.push_str(tag.raw);
                    }
                },
            }
        }

        Ok(Rewritten { text, stats })
    }

    /// Resolve, relocate and convert a single recognized tag.
    pub fn rewrite_tag(&self, tag: &CustomTag<'_>) -> Result<RewriteResult> {
        let thumbnail = tag.kind.wants_thumbnail(&tag.attributes);

        let reference = match MediaRef::from_attributes(&tag.attributes) {
            Ok(r) => r,
            Err(e) => return Ok(RewriteResult::Unchanged(e.into())),
        };

        let Some(media) = self.lookup.find_media(&reference)? else {
            return Ok(RewriteResult::Unchanged(SkipReason::MediaNotFound(
                reference,
            )));
        };

        let names = match media.asset_names(thumbnail) {
            Ok(n) => n,
            Err(e) => return Ok(RewriteResult::Unchanged(e.into())),
        };
        if thumbnail && !media.has_thumbnail_variant {
            debug!(media = media.id, "thumbnail requested but not flagged in media table");
        }

        match self.assets.relocate(&names.source, &names.destination) {
            Ok(true) => {}
            Ok(false) => {
                return Ok(RewriteResult::Unchanged(SkipReason::SourceMissing(
                    names.source,
                )))
            }
            Err(MigrateError::Io(e)) => {
                return Ok(RewriteResult::Unchanged(SkipReason::CopyFailed(format!(
                    "{} -> {}: {}",
                    names.source, names.destination, e
                ))))
            }
            Err(e) => return Err(e),
        }

        let src = self.image_url(&names.destination);
        Ok(RewriteResult::Replaced(build_img_tag(&src, tag, &media)))
    }

    fn image_url(&self, file_name: &str) -> String {
        let dir = self.images_dir.trim_matches('/');
        let base = self.image_base_url.trim_end_matches('/');
        if dir.is_empty() {
            format!("{}/{}", base, file_name)
        } else {
            format!("{}/{}/{}", base, dir, file_name)
        }
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `<img src="..." k="v" ... />` with the tag's own attributes first, then
/// alt text and caption from the media table when the tag didn't set them.
fn build_img_tag(src: &str, tag: &CustomTag<'_>, media: &MediaRecord) -> String {
    let mut html = format!("<img src=\"{}\" ", escape_attribute(src));

    let mut push = |name: &str, value: &str| {
        html.push_str(name);
        html.push_str("=\"");
        html.push_str(&escape_attribute(value));
        html.push_str("\" ");
    };

    for (name, value) in tag.attributes.iter() {
        if !IGNORED_ATTRIBUTES.contains(&name) {
            push(name, value);
        }
    }

    let stored = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
    if !tag.attributes.contains_key("alt") {
        if let Some(alt) = stored(&media.alt_text) {
            push("alt", &alt);
        }
    }
    if !tag.attributes.contains_key("title") {
        if let Some(caption) = stored(&media.caption) {
            push("title", &caption);
        }
    }

    html.push_str("/>");
    html
}
