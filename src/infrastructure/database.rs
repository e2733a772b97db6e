//! Read-only access to the legacy tables

use crate::domain::media::{MediaLookup, MediaRecord, MediaRef};
use crate::domain::post::{parse_posted, split_keywords, PostRecord, PostStatus};
use crate::domain::schema::QuerySet;
use crate::error::{MigrateError, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

/// Stream of published posts plus the site preferences they depend on
pub trait PostSource {
    /// Call `visit` once per published post, in publish order.
    fn each_published_post(
        &self,
        visit: &mut dyn FnMut(PostRecord) -> Result<()>,
    ) -> Result<()>;

    /// The `img_dir` preference, relative to the legacy base directory
    fn image_dir_preference(&self) -> Result<Option<String>>;
}

/// SQLite copy of a Textpattern database
pub struct SqliteSource {
    conn: Connection,
    queries: QuerySet,
}

impl SqliteSource {
    /// Open an existing database file read-only
    pub fn open(path: &Path, queries: QuerySet) -> Result<Self> {
        if !path.is_file() {
            return Err(MigrateError::Config(format!(
                "Database file not found: {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!(database = %path.display(), "opened legacy database");
        Ok(Self::from_connection(conn, queries))
    }

    pub fn from_connection(conn: Connection, queries: QuerySet) -> Self {
        SqliteSource { conn, queries }
    }

}

fn post_from_row(row: &Row<'_>) -> Result<PostRecord> {
    let title: Option<String> = row.get(0)?;
    let slug: String = row.get(1)?;
    let posted: String = row.get(2)?;
    let body: Option<String> = row.get(3)?;
    let keywords: Option<String> = row.get(4)?;

    let published_at = parse_posted(&posted).ok_or_else(|| MigrateError::InvalidDate {
        slug: slug.clone(),
        value: posted.clone(),
    })?;

    Ok(PostRecord {
        title: title.unwrap_or_default(),
        slug,
        published_at,
        body: body.unwrap_or_default(),
        keywords: keywords.as_deref().map(split_keywords).unwrap_or_default(),
    })
}

fn media_from_row(row: &Row<'_>) -> rusqlite::Result<MediaRecord> {
    let thumbnail: Option<i64> = row.get(5)?;
    Ok(MediaRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        extension: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        alt_text: row.get(3)?,
        caption: row.get(4)?,
        has_thumbnail_variant: thumbnail.unwrap_or(0) != 0,
    })
}

impl PostSource for SqliteSource {
    fn each_published_post(
        &self,
        visit: &mut dyn FnMut(PostRecord) -> Result<()>,
    ) -> Result<()> {
        let mut stmt = self.conn.prepare(&self.queries.posts)?;
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            let status: i64 = row.get(5)?;
            if !PostStatus::from_code(status).is_some_and(|s| s.is_published()) {
                debug!(status, "skipping row with unpublished status");
                continue;
            }
            visit(post_from_row(row)?)?;
        }
        Ok(())
    }

    fn image_dir_preference(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(&self.queries.image_dir, [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?;
        Ok(value.flatten())
    }
}

impl MediaLookup for SqliteSource {
    fn find_media(&self, reference: &MediaRef) -> Result<Option<MediaRecord>> {
        let found = match reference {
            MediaRef::Id(id) => {
                let mut stmt = self.conn.prepare_cached(&self.queries.media_by_id)?;
                stmt.query_row([id], media_from_row).optional()?
            }
            MediaRef::Name(name) => {
                let mut stmt = self.conn.prepare_cached(&self.queries.media_by_name)?;
                stmt.query_row([name], media_from_row).optional()?
            }
        };
        Ok(found)
    }
}

/// Minimal legacy schema, used by tests to build fixture databases
pub fn create_legacy_schema(conn: &Connection, prefix: &str) -> Result<()> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE {p}textpattern (
            ID        INTEGER PRIMARY KEY,
            Title     TEXT,
            url_title TEXT NOT NULL,
            Posted    TEXT NOT NULL,
            Body      TEXT,
            Keywords  TEXT,
            Status    INTEGER NOT NULL DEFAULT 4
        );
        CREATE TABLE {p}txp_prefs (
            name TEXT NOT NULL,
            val  TEXT
        );
        CREATE TABLE {p}txp_image (
            id        INTEGER PRIMARY KEY,
            name      TEXT NOT NULL,
            ext       TEXT,
            alt       TEXT,
            caption   TEXT,
            thumbnail INTEGER NOT NULL DEFAULT 0
        );
        ",
        p = prefix
    ))?;
    Ok(())
}
