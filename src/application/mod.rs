//! Application layer - Use cases and orchestration

pub mod migrate;

pub use migrate::{
    migrate, resolve_media_dir, MigrateOptions, MigrationReport, PipelineConfig, PostPipeline,
};
