//! Product metadata extraction
//!
//! Every field is resolved by its own ordered list of strategies. A strategy
//! either yields a value or nothing; the first value wins and the remaining
//! strategies for that field are never run. Nothing in here can fail the whole
//! extraction, so the worst case is a record with every field absent.

mod css_extractor;
mod jsonld_extractor;
mod meta_extractor;
mod pattern_extractor;

pub use css_extractor::*;
pub use jsonld_extractor::*;
pub use meta_extractor::*;
pub use pattern_extractor::*;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entities::clean_text;

/// Documents shorter than this many characters are treated as empty.
pub const MIN_HTML_LEN: usize = 100;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 300;

/// Best-effort product metadata scraped from a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Use the first `<h1>` as a last resort for the title.
    pub heading_fallback: bool,
}

/// Everything the strategies look at, parsed once per call.
pub struct Sources<'a> {
    pub html: &'a str,
    /// Length of `html` in characters.
    pub html_chars: usize,
    pub document: Html,
    pub meta: MetaTags,
    pub structured: StructuredData,
    pub options: &'a ExtractOptions,
}

impl<'a> Sources<'a> {
    pub fn new(html: &'a str, options: &'a ExtractOptions) -> Self {
        let document = Html::parse_document(html);
        let meta = MetaTags::from_html(html);
        let structured = StructuredData::from_document(&document);
        if structured.is_empty() {
            debug!("no JSON-LD on page");
        }
        Sources {
            html,
            html_chars: html.chars().count(),
            document,
            meta,
            structured,
            options,
        }
    }
}

type Strategy<T> = fn(&Sources<'_>) -> Option<T>;

const TITLE_STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("og:title", title_from_og),
    ("meta:title", title_from_meta),
    ("title", title_from_element),
    ("jsonld:name", title_from_jsonld),
    ("h1", title_from_heading),
];

const IMAGE_STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("og:image", image_from_og),
    ("jsonld:image", image_from_jsonld),
    ("img", image_from_img_tag),
];

const DESCRIPTION_STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("og:description", description_from_og),
    ("meta:description", description_from_meta_name),
    ("meta-property:description", description_from_meta_property),
    ("jsonld:description", description_from_jsonld),
    ("p", description_from_paragraph),
];

const PRICE_STRATEGIES: &[(&str, Strategy<String>)] = &[
    ("jsonld:offers.price", price_from_jsonld),
    ("patterns", price_from_html),
];

const RATING_STRATEGIES: &[(&str, Strategy<f64>)] = &[
    ("jsonld:aggregateRating", rating_from_jsonld),
    ("patterns", rating_from_html),
];

fn title_from_og(s: &Sources<'_>) -> Option<String> {
    s.meta.og("title")
}

fn title_from_meta(s: &Sources<'_>) -> Option<String> {
    s.meta.name("title")
}

fn title_from_element(s: &Sources<'_>) -> Option<String> {
    s.meta.title()
}

fn title_from_jsonld(s: &Sources<'_>) -> Option<String> {
    s.structured.name()
}

fn title_from_heading(s: &Sources<'_>) -> Option<String> {
    if !s.options.heading_fallback {
        return None;
    }
    first_text(&s.document, "h1")
}

fn image_from_og(s: &Sources<'_>) -> Option<String> {
    s.meta.og("image").and_then(|v| non_empty(v.trim()))
}

fn image_from_jsonld(s: &Sources<'_>) -> Option<String> {
    s.structured.image().map(|v| v.trim().to_string())
}

fn image_from_img_tag(s: &Sources<'_>) -> Option<String> {
    first_product_image(&s.document)
}

fn description_from_og(s: &Sources<'_>) -> Option<String> {
    s.meta.og("description")
}

fn description_from_meta_name(s: &Sources<'_>) -> Option<String> {
    s.meta.name("description")
}

fn description_from_meta_property(s: &Sources<'_>) -> Option<String> {
    s.meta.property("description")
}

fn description_from_jsonld(s: &Sources<'_>) -> Option<String> {
    s.structured.description()
}

fn description_from_paragraph(s: &Sources<'_>) -> Option<String> {
    first_descriptive_paragraph(&s.document, s.html_chars)
}

fn price_from_jsonld(s: &Sources<'_>) -> Option<String> {
    s.structured.offer_price()
}

fn price_from_html(s: &Sources<'_>) -> Option<String> {
    price_from_patterns(s.html)
}

fn rating_from_jsonld(s: &Sources<'_>) -> Option<f64> {
    s.structured.rating_value()
}

fn rating_from_html(s: &Sources<'_>) -> Option<f64> {
    rating_from_patterns(s.html)
}

/// Run strategies in order and stop at the first hit.
fn first_match<T>(
    sources: &Sources<'_>,
    field: &str,
    strategies: &[(&str, Strategy<T>)],
) -> Option<T> {
    for (name, strategy) in strategies {
        if let Some(value) = strategy(sources) {
            debug!(field, strategy = *name, "field resolved");
            return Some(value);
        }
    }
    debug!(field, "no strategy matched");
    None
}

/// Extract product metadata with default options.
pub fn extract_product_metadata(html: &str, asin: &str) -> ProductMetadata {
    extract_product_metadata_with(html, asin, &ExtractOptions::default())
}

/// Extract product metadata from a fetched product page.
///
/// `asin` is only used as log context.
pub fn extract_product_metadata_with(
    html: &str,
    asin: &str,
    options: &ExtractOptions,
) -> ProductMetadata {
    let chars = html.chars().count();
    if chars < MIN_HTML_LEN {
        warn!(asin, len = chars, "HTML too small or empty, skipping extraction");
        return ProductMetadata::default();
    }

    let sources = Sources::new(html, options);

    let title = first_match(&sources, "title", TITLE_STRATEGIES)
        .and_then(|t| clean_text(&t, MAX_TITLE_CHARS));
    let image = first_match(&sources, "image", IMAGE_STRATEGIES);
    let description = first_match(&sources, "description", DESCRIPTION_STRATEGIES)
        .and_then(|d| clean_text(&d, MAX_DESCRIPTION_CHARS));
    let price = first_match(&sources, "price", PRICE_STRATEGIES);
    let rating = first_match(&sources, "rating", RATING_STRATEGIES);

    let metadata = ProductMetadata {
        title,
        image,
        description,
        price,
        rating,
    };

    debug!(
        asin,
        title = metadata.title.is_some(),
        image = metadata.image.is_some(),
        description = metadata.description.is_some(),
        price = metadata.price.as_deref().unwrap_or("-"),
        rating = ?metadata.rating,
        "extraction finished"
    );

    metadata
}

/// The value if it has any non-whitespace content.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Trim and turn decimal commas into dots.
pub(crate) fn normalize_price(raw: &str) -> Option<String> {
    non_empty(raw.trim()).map(|p| p.replace(',', "."))
}

/// Parse a rating, accepting a decimal comma. Non-finite values are rejected.
pub(crate) fn parse_rating(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
