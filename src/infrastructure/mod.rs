//! Infrastructure layer - Database, file system and configuration I/O

pub mod config;
pub mod database;
pub mod repository;

pub use config::{read_table_prefix, MigrationConfig};
pub use database::{PostSource, SqliteSource};
pub use repository::{AssetRelocator, SiteRepository};
