//! CSS selector-based extraction
//!
//! Element-level fallbacks used once meta tags and JSON-LD have nothing.

use scraper::{Html, Selector};

use super::non_empty;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// Paragraph fallback only runs on documents longer than this many characters.
pub const PARAGRAPH_MIN_DOCUMENT_LEN: usize = 1000;

/// Text of the first element matching `selector_str` that has any.
pub fn first_text(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;

    document
        .select(&selector)
        .find_map(|el| non_empty(&el.text().collect::<String>()))
}

/// First `<img>` whose `src` looks like a real image file; `data-src` is
/// only consulted after every `src` has been rejected.
pub fn first_product_image(document: &Html) -> Option<String> {
    let selector = Selector::parse("img").ok()?;

    ["src", "data-src"].iter().find_map(|attr| {
        document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|src| is_plausible_image(src))
            .map(String::from)
    })
}

fn is_plausible_image(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    src.len() > 10 && IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

/// First `<p>` with 20 to 200 characters of text, on large documents only.
pub fn first_descriptive_paragraph(document: &Html, html_chars: usize) -> Option<String> {
    if html_chars <= PARAGRAPH_MIN_DOCUMENT_LEN {
        return None;
    }

    let selector = Selector::parse("p").ok()?;

    document.select(&selector).find_map(|el| {
        let text = el.text().collect::<String>();
        let text = text.trim();
        let len = text.chars().count();
        if (20..=200).contains(&len) {
            Some(text.to_string())
        } else {
            None
        }
    })
}
