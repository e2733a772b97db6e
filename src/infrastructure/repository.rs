//! File system repository for the generated site

use crate::domain::tags::AssetSink;
use crate::error::{MigrateError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output tree of a migration: posts and imported images
#[derive(Debug, Clone)]
pub struct SiteRepository {
    root: PathBuf,
    posts_dir: PathBuf,
    images_dir: PathBuf,
    dry_run: bool,
}

impl SiteRepository {
    /// `posts_dir` and `images_dir` are relative to `root`
    pub fn new(root: PathBuf, posts_dir: PathBuf, images_dir: PathBuf) -> Self {
        SiteRepository {
            root,
            posts_dir,
            images_dir,
            dry_run: false,
        }
    }

    /// A repository that reports what it would write without touching disk
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn posts_path(&self) -> PathBuf {
        self.root.join(&self.posts_dir)
    }

    pub fn images_path(&self) -> PathBuf {
        self.root.join(&self.images_dir)
    }

    /// Create the posts directory (and parents) if needed
    pub fn prepare_posts_dir(&self) -> Result<()> {
        self.create_dir_all(&self.posts_path())
    }

    /// Create the image directory (and parents) if needed
    pub fn prepare_images_dir(&self) -> Result<()> {
        self.create_dir_all(&self.images_path())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        fs::create_dir_all(path).map_err(MigrateError::Io)
    }

    /// Write a post file into the posts directory, overwriting any existing
    /// file. The directory must already exist (see [`Self::prepare_posts_dir`]).
    pub fn write_post(&self, filename: &str, content: &str) -> Result<PathBuf> {
        let path = self.posts_path().join(filename);
        if self.dry_run {
            debug!(file = %path.display(), "dry run, not writing post");
            return Ok(path);
        }

        fs::write(&path, content)?;
        Ok(path)
    }

    /// Copy `source` into the image directory as `dest_name`.
    ///
    /// Returns `false` when `source` doesn't exist.
    pub fn copy_asset(&self, source: &Path, dest_name: &str) -> Result<bool> {
        if !source.is_file() {
            return Ok(false);
        }

        let dest = self.images_path().join(dest_name);
        if self.dry_run {
            debug!(from = %source.display(), to = %dest.display(), "dry run, not copying image");
            return Ok(true);
        }

        if let Some(parent) = dest.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::copy(source, &dest)?;
        debug!(from = %source.display(), to = %dest.display(), "copied image");
        Ok(true)
    }
}

/// Relocates images from the legacy image directory into a [`SiteRepository`]
pub struct AssetRelocator<'a> {
    media_dir: &'a Path,
    repository: &'a SiteRepository,
}

impl<'a> AssetRelocator<'a> {
    pub fn new(media_dir: &'a Path, repository: &'a SiteRepository) -> Self {
        AssetRelocator {
            media_dir,
            repository,
        }
    }
}

impl AssetSink for AssetRelocator<'_> {
    fn relocate(&self, source_name: &str, dest_name: &str) -> Result<bool> {
        self.repository
            .copy_asset(&self.media_dir.join(source_name), dest_name)
    }
}
