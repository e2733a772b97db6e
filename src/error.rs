//! Error types for txp-migrate

use thiserror::Error;

/// Fatal errors that abort a migration run.
///
/// Per-tag problems never surface here: they are logged and the original
/// markup is kept (see [`crate::domain::tags`]).
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid table prefix: '{0}'")]
    InvalidTablePrefix(String),

    #[error("Invalid publish date '{value}' for post '{slug}'")]
    InvalidDate { slug: String, value: String },

    #[error("Front matter serialization error: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

impl MigrateError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::Config(_)
            | MigrateError::InvalidTablePrefix(_)
            | MigrateError::TomlDeserialize(_) => 2,
            MigrateError::Database(_) => 3,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            MigrateError::Database(e) => {
                format!(
                    "Database error: {}\n\n\
                    Suggestions:\n\
                    • Check that --database points at a SQLite copy of the Textpattern tables\n\
                    • If the installation uses a table prefix, pass --source so textpattern/config.php can be read\n\
                    • Verify the textpattern, txp_prefs and txp_image tables exist",
                    e
                )
            }
            MigrateError::InvalidTablePrefix(prefix) => {
                format!(
                    "Invalid table prefix: '{}'\n\n\
                    Table prefixes may only contain ASCII letters, digits and '_'.\n\
                    Check the $txpcfg['table_prefix'] line in textpattern/config.php",
                    prefix
                )
            }
            MigrateError::InvalidDate { slug, value } => {
                format!(
                    "Invalid publish date '{}' for post '{}'\n\n\
                    Expected format: YYYY-MM-DD HH:MM:SS (or YYYY-MM-DD)",
                    value, slug
                )
            }
            MigrateError::Config(msg) => {
                if msg.contains("config file") {
                    format!(
                        "{}\n\n\
                        Valid keys: posts_dir, images_dir, image_base_url\n\
                        Example: image_base_url = \"/\"",
                        msg
                    )
                } else {
                    msg.clone()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using MigrateError
pub type Result<T> = std::result::Result<T, MigrateError>;
