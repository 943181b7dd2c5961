//! HTML entity decoding and text cleanup for scraped strings.

use once_cell::sync::Lazy;
use regex::Regex;

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)&[a-z]+;|&#\d+;").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Named entities that get replaced. Lookup is exact, so `&AMP;` is kept.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#039;", "'"),
    ("&apos;", "'"),
    ("&nbsp;", " "),
];

/// Replace the fixed set of named entities with their characters.
///
/// Numeric references are matched but only `&#039;` is in the table; any other
/// (`&#65;`, `&#8364;`) is returned unchanged.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            let matched = &caps[0];
            NAMED_ENTITIES
                .iter()
                .find(|(entity, _)| *entity == matched)
                .map(|(_, replacement)| (*replacement).to_string())
                .unwrap_or_else(|| matched.to_string())
        })
        .into_owned()
}

/// Remove anything that looks like a tag.
pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// Decode, strip tags, trim and truncate to `max_chars` characters.
///
/// Returns `None` when nothing is left.
pub fn clean_text(text: &str, max_chars: usize) -> Option<String> {
    let decoded = decode_entities(text);
    let stripped = strip_tags(&decoded);
    let truncated: String = stripped.trim().chars().take(max_chars).collect();

    if truncated.is_empty() {
        None
    } else {
        Some(truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(
            decode_entities("&lt;b&gt; &quot;x&quot; it&#039;s it&apos;s a&nbsp;b"),
            "<b> \"x\" it's it's a b"
        );
    }

    #[test]
    fn test_numeric_references_pass_through() {
        assert_eq!(decode_entities("&#65;"), "&#65;");
        assert_eq!(decode_entities("5 &#8364;"), "5 &#8364;");
    }

    #[test]
    fn test_unknown_and_uppercase_entities_kept() {
        assert_eq!(decode_entities("&copy; &AMP;"), "&copy; &AMP;");
    }

    #[test]
    fn test_decode_is_single_pass() {
        assert_eq!(decode_entities("&amp;amp;"), "&amp;");
    }

    #[test]
    fn test_clean_text_order() {
        assert_eq!(
            clean_text("  &lt;b&gt;Bold&lt;/b&gt; name  ", 200).as_deref(),
            Some("Bold name")
        );
        assert_eq!(clean_text("abcdef", 3).as_deref(), Some("abc"));
        assert_eq!(clean_text("äöüß", 2).as_deref(), Some("äö"));
    }

    #[test]
    fn test_clean_text_empty_is_none() {
        assert_eq!(clean_text("   ", 10), None);
        assert_eq!(clean_text("<span></span>", 10), None);
    }
}
