//! Migration use case
//!
//! Reads published posts from the legacy database, rewrites their image
//! tags and writes one front-matter file per post.

use crate::domain::tags::{AssetSink, RewriteStats, TagRewriter};
use crate::domain::{CachedLookup, FrontMatter, MediaLookup, QuerySet};
use crate::error::Result;
use crate::infrastructure::{
    read_table_prefix, AssetRelocator, MigrationConfig, PostSource, SiteRepository, SqliteSource,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Entry parameters of a run
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// SQLite copy of the legacy database
    pub database: PathBuf,
    /// Legacy base directory holding `textpattern/config.php` and images
    pub source_dir: Option<PathBuf>,
    /// Root of the generated site
    pub output_dir: PathBuf,
    pub config: MigrationConfig,
    pub dry_run: bool,
}

/// Settings the pipeline runs with, fixed before the first post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub image_base_url: String,
    /// URL path of the image directory, relative to `image_base_url`
    pub images_dir: String,
    /// Legacy image directory. `None` disables image processing entirely.
    pub media_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn processes_images(&self) -> bool {
        self.media_dir.is_some()
    }
}

/// Summary of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub posts_written: usize,
    /// Posts that replaced a file written earlier in the same run
    pub collisions: usize,
    /// Posts not written because their slug is not a safe file name
    pub skipped: usize,
    pub tags: RewriteStats,
    pub media_processing: bool,
    pub dry_run: bool,
}

/// Decide once per run whether images are processed.
///
/// Images are processed only when a source directory was given and the
/// `img_dir` preference resolves to an existing directory inside it.
pub fn resolve_media_dir(
    source: &dyn PostSource,
    source_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let Some(base) = source_dir else {
        info!("Skipping image processing - no source directory");
        return Ok(None);
    };

    let Some(img_dir) = source.image_dir_preference()? else {
        warn!("No img_dir preference found in the database");
        info!("Skipping image processing - no image directory");
        return Ok(None);
    };

    let media_dir = base.join(img_dir.trim());
    if media_dir.is_dir() {
        debug!(dir = %media_dir.display(), "processing images");
        Ok(Some(media_dir))
    } else {
        warn!(
            "Could not locate Textpattern image directory: {}",
            media_dir.display()
        );
        info!("Skipping image processing - no image directory");
        Ok(None)
    }
}

/// Post Record Pipeline: one output file per published post
pub struct PostPipeline<'a> {
    posts: &'a dyn PostSource,
    media: &'a dyn MediaLookup,
    repository: &'a SiteRepository,
    config: &'a PipelineConfig,
}

impl<'a> PostPipeline<'a> {
    pub fn new(
        posts: &'a dyn PostSource,
        media: &'a dyn MediaLookup,
        repository: &'a SiteRepository,
        config: &'a PipelineConfig,
    ) -> Self {
        PostPipeline {
            posts,
            media,
            repository,
            config,
        }
    }

    pub fn run(&self) -> Result<MigrationReport> {
        let mut report = MigrationReport {
            media_processing: self.config.processes_images(),
            dry_run: self.repository.is_dry_run(),
            ..MigrationReport::default()
        };

        self.repository.prepare_posts_dir()?;

        let relocator = match &self.config.media_dir {
            Some(dir) => {
                self.repository.prepare_images_dir()?;
                Some(AssetRelocator::new(dir, self.repository))
            }
            None => None,
        };
        let rewriter = relocator.as_ref().map(|assets| {
            TagRewriter::new(
                self.media,
                assets as &dyn AssetSink,
                &self.config.image_base_url,
                &self.config.images_dir,
            )
        });

        // filename -> slug of the post that wrote it
        let mut written: HashMap<String, String> = HashMap::new();

        self.posts.each_published_post(&mut |mut post| {
            let filename = match post.output_filename() {
                Ok(name) => name,
                Err(e) => {
                    warn!(title = %post.title, "Skipping post: {}", e);
                    report.skipped += 1;
                    return Ok(());
                }
            };

            if let Some(rewriter) = &rewriter {
                let rewritten = rewriter.rewrite(&post.body)?;
                report.tags += rewritten.stats;
                post.body = rewritten.text;
            }

            let document = FrontMatter::from_post(&post).render(&post.body)?;

            if let Some(previous) = written.insert(filename.clone(), post.slug.clone()) {
                warn!(
                    file = %filename,
                    previous = %previous,
                    slug = %post.slug,
                    "output file already written in this run, overwriting"
                );
                report.collisions += 1;
            }

            let path = self.repository.write_post(&filename, &document)?;
            info!(file = %path.display(), "migrated post");
            report.posts_written += 1;
            Ok(())
        })?;

        Ok(report)
    }
}

/// Run a full migration
pub fn migrate(options: &MigrateOptions) -> Result<MigrationReport> {
    let prefix = read_table_prefix(options.source_dir.as_deref())?;
    let queries = QuerySet::new(&prefix);

    let source = SqliteSource::open(&options.database, queries)?;
    let media_dir = resolve_media_dir(&source, options.source_dir.as_deref())?;

    let repository = SiteRepository::new(
        options.output_dir.clone(),
        options.config.posts_dir.clone(),
        PathBuf::from(&options.config.images_dir),
    )
    .dry_run(options.dry_run);

    let pipeline_config = PipelineConfig {
        image_base_url: options.config.image_base_url.clone(),
        images_dir: options.config.images_dir.clone(),
        media_dir,
    };

    let media = CachedLookup::new(&source);
    PostPipeline::new(&source, &media, &repository, &pipeline_config).run()
}
