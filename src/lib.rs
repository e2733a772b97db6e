//! txp-migrate - Textpattern to Jekyll migration
//!
//! Reads published articles from a Textpattern database and writes them as
//! `.textile` posts with YAML front matter, converting Textpattern image
//! tags into HTML and copying the referenced images along the way.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::MigrateError;
