//! OpenGraph, named meta tag and `<title>` extraction
//!
//! These values are read straight from the markup rather than through the DOM:
//! the HTML parser resolves every character reference in attributes and text,
//! while the cleanup step only decodes a fixed set of named entities and must
//! see everything else untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::non_empty;

/// A `<meta ...>` tag; quoted attribute values may contain `>`.
static META_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap());

static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)([^\s=/>"']+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());

/// Meta tag contents keyed by lowercased `property` / `name`, plus the
/// `<title>` text. The first tag with non-empty content wins for a given key.
/// Values are kept exactly as written in the markup.
#[derive(Debug, Clone, Default)]
pub struct MetaTags {
    properties: HashMap<String, String>,
    names: HashMap<String, String>,
    title: Option<String>,
}

impl MetaTags {
    pub fn from_html(html: &str) -> Self {
        let mut tags = MetaTags {
            title: TITLE_RE
                .captures(html)
                .and_then(|c| c.get(1))
                .and_then(|m| non_empty(m.as_str())),
            ..Default::default()
        };

        for tag in META_TAG_RE.find_iter(html) {
            let attributes = parse_attributes(tag.as_str());
            let content = match attributes.get("content") {
                Some(content) if !content.trim().is_empty() => *content,
                _ => continue,
            };

            if let Some(prop) = attributes.get("property") {
                tags.properties
                    .entry(prop.to_ascii_lowercase())
                    .or_insert_with(|| content.to_string());
            }
            if let Some(name) = attributes.get("name") {
                tags.names
                    .entry(name.to_ascii_lowercase())
                    .or_insert_with(|| content.to_string());
            }
        }

        tags
    }

    /// `og:<key>` property, e.g. `og("title")`.
    pub fn og(&self, key: &str) -> Option<String> {
        self.property(&format!("og:{}", key))
    }

    pub fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    pub fn name(&self, key: &str) -> Option<String> {
        self.names.get(key).cloned()
    }

    /// Raw text of the first `<title>` element.
    pub fn title(&self) -> Option<String> {
        self.title.clone()
    }
}

/// Attribute values of one tag keyed by lowercased name; the first wins.
fn parse_attributes(tag: &str) -> HashMap<String, &str> {
    let mut attributes = HashMap::new();
    for caps in ATTRIBUTE_RE.captures_iter(tag) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        attributes
            .entry(caps[1].to_ascii_lowercase())
            .or_insert(value);
    }
    attributes
}
