//! Media records from `txp_image` and the file names derived from them

use crate::domain::tags::Attributes;
use crate::error::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Metadata row describing one stored image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    pub id: i64,
    /// Original upload name, e.g. `cat.jpg`
    pub name: String,
    /// Extension as stored, usually with its leading dot (`.jpg`)
    pub extension: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub has_thumbnail_variant: bool,
}

/// How a tag refers to a media record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaRef {
    Id(i64),
    Name(String),
}

/// Why a tag's attributes don't identify a media record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("no id or name attribute")]
    Missing,
    #[error("id attribute is not an integer: '{0}'")]
    InvalidId(String),
}

impl MediaRef {
    /// `id` takes precedence over `name`; an unparseable id does not fall
    /// back to the name.
    pub fn from_attributes(attributes: &Attributes) -> std::result::Result<Self, ReferenceError> {
        if let Some(id) = attributes.get("id") {
            return id
                .trim()
                .parse::<i64>()
                .map(MediaRef::Id)
                .map_err(|_| ReferenceError::InvalidId(id.to_string()));
        }

        match attributes.get("name") {
            Some(name) => Ok(MediaRef::Name(name.to_string())),
            None => Err(ReferenceError::Missing),
        }
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRef::Id(id) => write!(f, "id {}", id),
            MediaRef::Name(name) => write!(f, "name \"{}\"", name),
        }
    }
}

/// Source and destination file names for one asset copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNames {
    /// Name inside the legacy image directory (`7.jpg`, `7t.jpg`)
    pub source: String,
    /// Name inside the site's image directory (`cat.jpg`, `cat_t.jpg`)
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("media name cannot be used as a file name: '{0}'")]
pub struct UnsafeMediaName(pub String);

impl MediaRecord {
    fn dotted_extension(&self) -> String {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            self.extension.clone()
        } else {
            format!(".{}", self.extension)
        }
    }

    /// Derive the file names for the full image or its thumbnail.
    ///
    /// The thumbnail suffix `_t` goes before the last `.` of the name. Names
    /// without an extension get the record's extension appended.
    pub fn asset_names(&self, thumbnail: bool) -> std::result::Result<AssetNames, UnsafeMediaName> {
        let name = self.name.trim();
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name.contains("..")
        {
            return Err(UnsafeMediaName(self.name.clone()));
        }

        let ext = self.dotted_extension();
        let source = format!("{}{}{}", self.id, if thumbnail { "t" } else { "" }, ext);

        let (stem, name_ext) = match name.rfind('.') {
            Some(i) if i > 0 => (&name[..i], &name[i..]),
            _ => (name, ext.as_str()),
        };
        if name.matches('.').count() != 1 {
            debug!(media = %self.name, "media name has no single extension dot");
        }

        let destination = if thumbnail {
            format!("{}_t{}", stem, name_ext)
        } else {
            format!("{}{}", stem, name_ext)
        };

        Ok(AssetNames {
            source,
            destination,
        })
    }
}

/// Read access to the media table
pub trait MediaLookup {
    fn find_media(&self, reference: &MediaRef) -> Result<Option<MediaRecord>>;
}

impl<L: MediaLookup + ?Sized> MediaLookup for &L {
    fn find_media(&self, reference: &MediaRef) -> Result<Option<MediaRecord>> {
        (**self).find_media(reference)
    }
}

/// Memoises lookups (hits and misses) for the duration of a run
pub struct CachedLookup<L> {
    inner: L,
    cache: RefCell<HashMap<MediaRef, Option<MediaRecord>>>,
}

impl<L: MediaLookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        CachedLookup {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: MediaLookup> MediaLookup for CachedLookup<L> {
    fn find_media(&self, reference: &MediaRef) -> Result<Option<MediaRecord>> {
        if let Some(hit) = self.cache.borrow().get(reference) {
            return Ok(hit.clone());
        }

        let found = self.inner.find_media(reference)?;
        self.cache
            .borrow_mut()
            .insert(reference.clone(), found.clone());
        Ok(found)
    }
}
