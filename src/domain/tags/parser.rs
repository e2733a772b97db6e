//! Scanner for `<txp:... />` tags embedded in article bodies
//!
//! Grammar of a self-closing tag (must fit on one line):
//!
//! ```text
//! tag   := "<txp:" name (ws+ attr)* ws* "/>"
//! attr  := key ws* "=" ws* value
//! value := '"' [^"]* '"' | "'" [^']* "'" | bare
//! ```
//!
//! Anything that looks like a tag but breaks the grammar is reported as
//! [`Segment::Invalid`] so callers can keep the original text.

use std::fmt;
use thiserror::Error;

const OPEN: &str = "<txp:";
const CLOSE: &str = "/>";

/// Tags that reference images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Image,
    Thumbnail,
    ArticleImage,
}

impl TagKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "image" => Some(TagKind::Image),
            "thumbnail" => Some(TagKind::Thumbnail),
            "article-image" => Some(TagKind::ArticleImage),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TagKind::Image => "image",
            TagKind::Thumbnail => "thumbnail",
            TagKind::ArticleImage => "article-image",
        }
    }

    /// `article-image` only uses the thumbnail when asked with `thumbnail="1"`
    pub fn wants_thumbnail(&self, attributes: &Attributes) -> bool {
        match self {
            TagKind::Image => false,
            TagKind::Thumbnail => true,
            TagKind::ArticleImage => attributes.get("thumbnail").map(str::trim) == Some("1"),
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tag attributes with unique keys, kept in first-seen order.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A recognized image tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTag<'a> {
    pub kind: TagKind,
    pub attributes: Attributes,
    /// The tag exactly as it appears in the body
    pub raw: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    #[error("tag has no name")]
    MissingName,
    #[error("nested tag")]
    Nested,
    #[error("tag is not closed with '/>' on the same line")]
    Unterminated,
    #[error("expected an attribute name, found '{0}'")]
    ExpectedKey(char),
    #[error("attribute '{0}' has no value")]
    MissingValue(String),
    #[error("unclosed quote in attribute '{0}'")]
    UnclosedQuote(String),
    #[error("unexpected text after the value of attribute '{0}'")]
    TrailingText(String),
}

/// One piece of a scanned body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Tag(CustomTag<'a>),
    /// A well-formed tag with a name we don't rewrite
    Unrecognized { name: &'a str, raw: &'a str },
    Invalid {
        raw: &'a str,
        error: TagParseError,
    },
}

impl Segment<'_> {
    /// Original text covered by this segment
    pub fn raw(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Tag(tag) => tag.raw,
            Segment::Unrecognized { raw, .. } | Segment::Invalid { raw, .. } => raw,
        }
    }
}

/// Where a candidate tag starting at `<txp:` ends
enum TagEnd {
    /// Byte offset just past `/>`
    SelfClosing(usize),
    /// An opening tag of a container (`<txp:if_section name="x">`)
    Container(usize),
    /// A `<` appeared inside the tag; offset just past the final `/>`
    Nested(usize),
    /// No `/>` before the end of the line
    Unterminated(usize),
}

fn find_tag_end(body: &str, from: usize) -> TagEnd {
    let bytes = body.as_bytes();
    let mut quote: Option<u8> = None;
    let mut nested = false;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            return TagEnd::Unterminated(i);
        }

        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                } else if bytes[i..].starts_with(OPEN.as_bytes()) {
                    nested = true;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'/' if bytes.get(i + 1) == Some(&b'>') => {
                    let end = i + CLOSE.len();
                    return if nested {
                        TagEnd::Nested(end)
                    } else {
                        TagEnd::SelfClosing(end)
                    };
                }
                b'>' if !nested => return TagEnd::Container(i + 1),
                b'<' => nested = true,
                _ => {}
            },
        }
        i += 1;
    }

    TagEnd::Unterminated(bytes.len())
}

/// Split a body into text and tag segments.
///
/// Concatenating the [`Segment::raw`] of every segment reproduces `body`.
pub fn scan(body: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(offset) = body[cursor..].find(OPEN) {
        let start = cursor + offset;
        let inner_start = start + OPEN.len();

        let (end, segment) = match find_tag_end(body, inner_start) {
            TagEnd::Container(end) => {
                // Stays part of the surrounding text
                cursor = end;
                continue;
            }
            TagEnd::SelfClosing(end) => {
                let raw = &body[start..end];
                let inner = &body[inner_start..end - CLOSE.len()];
                (end, classify(raw, inner))
            }
            TagEnd::Nested(end) => (
                end,
                malformed(&body[start..end], &body[inner_start..end], TagParseError::Nested),
            ),
            TagEnd::Unterminated(end) => (
                end,
                malformed(
                    &body[start..end],
                    &body[inner_start..end],
                    TagParseError::Unterminated,
                ),
            ),
        };

        if text_start < start {
            segments.push(Segment::Text(&body[text_start..start]));
        }
        segments.push(segment);
        text_start = end;
        cursor = end;
    }

    if text_start < body.len() {
        segments.push(Segment::Text(&body[text_start..]));
    }

    segments
}

/// Leading name token of a tag's inner text
fn tag_name(inner: &str) -> &str {
    let end = inner
        .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '<' | '"' | '\''))
        .unwrap_or(inner.len());
    &inner[..end]
}

/// A tag that breaks the grammar is only an error if it names an image tag
fn malformed<'a>(raw: &'a str, inner: &'a str, error: TagParseError) -> Segment<'a> {
    let name = tag_name(inner);
    if !name.is_empty() && TagKind::from_name(name).is_none() {
        Segment::Unrecognized { name, raw }
    } else {
        Segment::Invalid { raw, error }
    }
}

fn classify<'a>(raw: &'a str, inner: &'a str) -> Segment<'a> {
    let inner = inner.trim();
    let (name, rest) = match inner.find(char::is_whitespace) {
        Some(i) => (&inner[..i], &inner[i..]),
        None => (inner, ""),
    };

    if name.is_empty() {
        return Segment::Invalid {
            raw,
            error: TagParseError::MissingName,
        };
    }

    let Some(kind) = TagKind::from_name(name) else {
        return Segment::Unrecognized { name, raw };
    };

    match parse_attributes(rest) {
        Ok(attributes) => Segment::Tag(CustomTag {
            kind,
            attributes,
            raw,
        }),
        Err(error) => Segment::Invalid { raw, error },
    }
}

/// Parse `key="value"` pairs separated by whitespace.
pub fn parse_attributes(input: &str) -> Result<Attributes, TagParseError> {
    let mut attributes = Attributes::new();
    let mut chars = input.char_indices().peekable();

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some(&(key_start, first)) = chars.peek() else {
            break;
        };
        if first == '=' || first == '"' || first == '\'' {
            return Err(TagParseError::ExpectedKey(first));
        }

        let mut key_end = key_start;
        while let Some((i, c)) =
            chars.next_if(|(_, c)| !c.is_whitespace() && !matches!(c, '=' | '"' | '\''))
        {
            key_end = i + c.len_utf8();
        }
        let key = &input[key_start..key_end];

        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        if chars.next_if(|(_, c)| *c == '=').is_none() {
            return Err(TagParseError::MissingValue(key.to_string()));
        }
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let value = match chars.peek().copied() {
            Some((open, q @ ('"' | '\''))) => {
                chars.next();
                let value_start = open + 1;
                let mut value_end = None;
                for (i, c) in chars.by_ref() {
                    if c == q {
                        value_end = Some(i);
                        break;
                    }
                }
                let value_end =
                    value_end.ok_or_else(|| TagParseError::UnclosedQuote(key.to_string()))?;

                if chars.peek().is_some_and(|(_, c)| !c.is_whitespace()) {
                    return Err(TagParseError::TrailingText(key.to_string()));
                }
                &input[value_start..value_end]
            }
            Some((value_start, _)) => {
                let mut value_end = value_start;
                while let Some((i, c)) =
                    chars.next_if(|(_, c)| !c.is_whitespace() && !matches!(c, '"' | '\''))
                {
                    value_end = i + c.len_utf8();
                }
                if value_end == value_start {
                    return Err(TagParseError::MissingValue(key.to_string()));
                }
                &input[value_start..value_end]
            }
            None => return Err(TagParseError::MissingValue(key.to_string())),
        };

        attributes.insert(key, value);
    }

    Ok(attributes)
}
