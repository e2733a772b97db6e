//! Configuration management

use crate::domain::schema::{extract_table_prefix, is_valid_prefix, LEGACY_CONFIG_FILE};
use crate::error::{MigrateError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Output layout of the migrated site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationConfig {
    /// Directory receiving post files, relative to the output root
    pub posts_dir: PathBuf,
    /// Directory receiving images, relative to the output root
    pub images_dir: String,
    /// Prefix for `<img src>` URLs
    pub image_base_url: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        MigrationConfig {
            posts_dir: PathBuf::from("_posts"),
            images_dir: "images/import".to_string(),
            image_base_url: "/".to_string(),
        }
    }
}

impl MigrationConfig {
    /// Load settings from a TOML file. Keys left out keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MigrateError::Config(format!("Missing config file: {}", path.display()))
            } else {
                MigrateError::Io(e)
            }
        })?;

        let config: MigrationConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Use the file when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.posts_dir.as_os_str().is_empty() {
            return Err(MigrateError::Config(
                "posts_dir in config file must not be empty".to_string(),
            ));
        }
        if self.posts_dir.is_absolute() || Path::new(&self.images_dir).is_absolute() {
            return Err(MigrateError::Config(
                "posts_dir and images_dir in config file must be relative to the output directory"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Read the table prefix from `<source>/textpattern/config.php`.
///
/// A missing source directory or config file is not an error: the prefix
/// is empty and the run continues.
pub fn read_table_prefix(source_dir: Option<&Path>) -> Result<String> {
    let Some(dir) = source_dir else {
        debug!("no source directory given, assuming no table prefix");
        return Ok(String::new());
    };

    let config_path = dir.join(LEGACY_CONFIG_FILE);
    let bytes = match fs::read(&config_path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Missing Textpattern config file: {}",
                config_path.display()
            );
            return Ok(String::new());
        }
        Err(e) => return Err(MigrateError::Io(e)),
    };

    // config.php is not guaranteed to be UTF-8
    let text = String::from_utf8_lossy(&bytes);
    let prefix = extract_table_prefix(&text).unwrap_or_default();

    if !is_valid_prefix(&prefix) {
        return Err(MigrateError::InvalidTablePrefix(prefix));
    }
    if !prefix.is_empty() {
        info!(prefix = %prefix, "using table prefix");
    }
    Ok(prefix)
}
