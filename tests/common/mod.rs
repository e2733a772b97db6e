#![allow(dead_code)]

use assert_cmd::Command;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use txp_migrate::infrastructure::database::create_legacy_schema;

pub fn migrate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("txp-migrate").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A throwaway Textpattern installation: database, base directory and an
/// empty site root to migrate into.
pub struct LegacySite {
    pub temp: TempDir,
    prefix: String,
    conn: Connection,
}

impl LegacySite {
    pub fn new() -> Self {
        Self::with_prefix("")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("txp")).unwrap();
        fs::create_dir_all(temp.path().join("site")).unwrap();
        let conn = Connection::open(temp.path().join("txp.sqlite")).unwrap();
        create_legacy_schema(&conn, prefix).unwrap();
        LegacySite {
            temp,
            prefix: prefix.to_string(),
            conn,
        }
    }

    pub fn database(&self) -> PathBuf {
        self.temp.path().join("txp.sqlite")
    }

    pub fn source_dir(&self) -> PathBuf {
        self.temp.path().join("txp")
    }

    pub fn site_dir(&self) -> PathBuf {
        self.temp.path().join("site")
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.site_dir().join("_posts")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.site_dir().join("images/import")
    }

    pub fn add_post(&self, slug: &str, posted: &str, status: i64, body: &str, keywords: &str) {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {}textpattern (Title, url_title, Posted, Body, Keywords, Status) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    self.prefix
                ),
                params![format!("Post {}", slug), slug, posted, body, keywords, status],
            )
            .unwrap();
    }

    pub fn set_image_dir(&self, dir: &str) {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {}txp_prefs (name, val) VALUES ('img_dir', ?1)",
                    self.prefix
                ),
                params![dir],
            )
            .unwrap();
        fs::create_dir_all(self.source_dir().join(dir)).unwrap();
    }

    pub fn add_image(&self, id: i64, name: &str, ext: &str, alt: &str, thumbnail: bool) {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {}txp_image (id, name, ext, alt, caption, thumbnail) \
                     VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
                    self.prefix
                ),
                params![id, name, ext, alt, thumbnail as i64],
            )
            .unwrap();
    }

    /// Put a stored image file (e.g. `7.jpg`, `7t.jpg`) into the image directory
    pub fn write_image_file(&self, image_dir: &str, file: &str, contents: &[u8]) {
        fs::write(self.source_dir().join(image_dir).join(file), contents).unwrap();
    }

    pub fn write_legacy_config(&self, contents: &str) {
        let path = self.source_dir().join("textpattern/config.php");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read_post(&self, filename: &str) -> String {
        fs::read_to_string(self.posts_dir().join(filename)).unwrap()
    }

    pub fn command(&self) -> Command {
        let mut cmd = migrate_cmd();
        cmd.arg("--database")
            .arg(self.database())
            .arg("--output")
            .arg(self.site_dir());
        cmd
    }

    pub fn command_with_source(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("--source").arg(self.source_dir());
        cmd
    }
}

/// Relative path and contents of every file under `root`, sorted
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<(PathBuf, Vec<u8>)> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}
