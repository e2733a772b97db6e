//! Post records read from the legacy `textpattern` table

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Extension of every migrated post file
pub const POST_EXTENSION: &str = "textile";

/// Article status codes used by the legacy schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Draft,
    Hidden,
    Pending,
    Live,
    Sticky,
}

impl PostStatus {
    /// Statuses that are migrated
    pub const PUBLISHED: [PostStatus; 2] = [PostStatus::Live, PostStatus::Sticky];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(PostStatus::Draft),
            2 => Some(PostStatus::Hidden),
            3 => Some(PostStatus::Pending),
            4 => Some(PostStatus::Live),
            5 => Some(PostStatus::Sticky),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            PostStatus::Draft => 1,
            PostStatus::Hidden => 2,
            PostStatus::Pending => 3,
            PostStatus::Live => 4,
            PostStatus::Sticky => 5,
        }
    }

    pub fn is_published(&self) -> bool {
        Self::PUBLISHED.contains(self)
    }
}

/// One published article
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub title: String,
    pub slug: String,
    pub published_at: NaiveDateTime,
    pub body: String,
    pub keywords: Vec<String>,
}

/// A slug that would not stay inside the posts directory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slug cannot be used as a file name: '{0}'")]
pub struct UnsafeSlug(pub String);

impl PostRecord {
    /// `<YYYY-MM-DD>-<slug>.textile`
    pub fn output_filename(&self) -> Result<String, UnsafeSlug> {
        let slug = self.slug.as_str();
        if slug.trim().is_empty()
            || slug.contains('/')
            || slug.contains('\\')
            || slug.contains("..")
        {
            return Err(UnsafeSlug(self.slug.clone()));
        }

        Ok(format!(
            "{}-{}.{}",
            self.published_at.format("%Y-%m-%d"),
            slug,
            POST_EXTENSION
        ))
    }
}

/// Parse the `Posted` column.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (optionally with fractional seconds or a
/// `T` separator) and bare `YYYY-MM-DD`, which is taken as midnight.
pub fn parse_posted(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Split the comma separated `Keywords` column into tags.
pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
