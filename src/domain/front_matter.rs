//! YAML front matter for migrated posts

use crate::domain::post::PostRecord;
use crate::error::Result;
use serde::Serialize;

pub const POST_LAYOUT: &str = "post";

/// Header block written before each post body. Empty values are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontMatter {
    pub layout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl FrontMatter {
    pub fn from_post(post: &PostRecord) -> Self {
        let title = Some(post.title.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        FrontMatter {
            layout: POST_LAYOUT.to_string(),
            title,
            tags: post.keywords.clone(),
        }
    }

    /// `---`, the YAML header, `---`, then the body with a trailing newline.
    pub fn render(&self, body: &str) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;

        let mut document = String::with_capacity(yaml.len() + body.len() + 9);
        document.push_str("---\n");
        document.push_str(&yaml);
        if !yaml.ends_with('\n') {
            document.push('\n');
        }
        document.push_str("---\n");
        document.push_str(body);
        if !body.ends_with('\n') {
            document.push('\n');
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::parse_posted;

    fn post(title: &str, keywords: &[&str]) -> PostRecord {
        PostRecord {
            title: title.to_string(),
            slug: "hello-world".to_string(),
            published_at: parse_posted("2012-01-05 00:00:00").unwrap(),
            body: "Body".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_full_header() {
        let fm = FrontMatter::from_post(&post("Hello World", &["rust", "cms"]));
        let doc = fm.render("p. Hi").unwrap();
        assert_eq!(
            doc,
            "---\nlayout: post\ntitle: Hello World\ntags:\n- rust\n- cms\n---\np. Hi\n"
        );
    }

    #[test]
    fn test_empty_keywords_omit_tags() {
        let fm = FrontMatter::from_post(&post("Hello", &[]));
        let doc = fm.render("Body").unwrap();
        assert!(!doc.contains("tags"));
        assert_eq!(doc, "---\nlayout: post\ntitle: Hello\n---\nBody\n");
    }

    #[test]
    fn test_empty_title_omitted() {
        let fm = FrontMatter::from_post(&post("   ", &["a"]));
        assert_eq!(fm.title, None);
        let doc = fm.render("").unwrap();
        assert!(!doc.contains("title"));
        assert!(doc.starts_with("---\nlayout: post\n"));
    }

    #[test]
    fn test_body_newline_not_doubled() {
        let fm = FrontMatter::from_post(&post("T", &[]));
        let doc = fm.render("line\n").unwrap();
        assert!(doc.ends_with("---\nline\n"));
    }

    #[test]
    fn test_title_with_colon_is_quoted() {
        let fm = FrontMatter::from_post(&post("Rust: a review", &[]));
        let doc = fm.render("x").unwrap();
        let header = doc.split("---\n").nth(1).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(header).unwrap();
        assert_eq!(parsed["title"].as_str(), Some("Rust: a review"));
    }
}
