//! Domain layer - Legacy schema model and content transformation

pub mod front_matter;
pub mod media;
pub mod post;
pub mod schema;
pub mod tags;

pub use front_matter::FrontMatter;
pub use media::{CachedLookup, MediaLookup, MediaRecord, MediaRef};
pub use post::{PostRecord, PostStatus};
pub use schema::QuerySet;
