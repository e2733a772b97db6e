//! Table prefix discovery and query construction

use crate::domain::post::PostStatus;
use regex::Regex;
use std::sync::OnceLock;

/// Legacy config path, relative to the Textpattern base directory
pub const LEGACY_CONFIG_FILE: &str = "textpattern/config.php";

pub const POSTS_TABLE: &str = "textpattern";
pub const PREFS_TABLE: &str = "txp_prefs";
pub const MEDIA_TABLE: &str = "txp_image";

/// Matches `$txpcfg['table_prefix'] = 'abc_';`
fn prefix_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"\$txpcfg\[\s*'table_prefix'\s*\]\s*=\s*'([^']*)'"#).unwrap()
    })
}

/// Extract the table prefix from the contents of `config.php`.
///
/// Every line is checked and the last assignment wins, so a prefix that is
/// redefined further down the file takes effect.
pub fn extract_table_prefix(config_text: &str) -> Option<String> {
    config_text
        .lines()
        .rev()
        .find_map(|line| prefix_regex().captures(line))
        .map(|cap| cap[1].to_string())
}

/// Whether a prefix can be spliced into an SQL identifier as-is
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The queries issued against the legacy schema, with the prefix applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySet {
    /// Published posts (status live or sticky)
    pub posts: String,
    /// The `img_dir` preference
    pub image_dir: String,
    pub media_by_id: String,
    pub media_by_name: String,
}

impl QuerySet {
    /// Build fresh query strings for the given table prefix (may be empty).
    pub fn new(prefix: &str) -> Self {
        let posts_table = format!("{}{}", prefix, POSTS_TABLE);
        let prefs_table = format!("{}{}", prefix, PREFS_TABLE);
        let media_table = format!("{}{}", prefix, MEDIA_TABLE);

        let media_columns = "id, name, ext, alt, caption, thumbnail";
        let published = PostStatus::PUBLISHED
            .iter()
            .map(|s| s.code().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        QuerySet {
            posts: format!(
                "SELECT Title, url_title, Posted, Body, Keywords, Status \
                 FROM {} \
                 WHERE Status IN ({}) \
                 ORDER BY Posted, ID",
                posts_table, published
            ),
            image_dir: format!("SELECT val FROM {} WHERE name = 'img_dir'", prefs_table),
            media_by_id: format!("SELECT {} FROM {} WHERE id = ?1", media_columns, media_table),
            media_by_name: format!(
                "SELECT {} FROM {} WHERE name = ?1 ORDER BY id DESC LIMIT 1",
                media_columns, media_table
            ),
        }
    }

    fn all(&self) -> [&str; 4] {
        [
            &self.posts,
            &self.image_dir,
            &self.media_by_id,
            &self.media_by_name,
        ]
    }
}

impl Default for QuerySet {
    fn default() -> Self {
        QuerySet::new("")
    }
}

impl std::fmt::Display for QuerySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for query in self.all() {
            writeln!(f, "{}", query)?;
        }
        Ok(())
    }
}
