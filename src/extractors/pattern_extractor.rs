//! Regex fallbacks over the raw HTML for prices and ratings that only appear
//! in inline scripts or visible text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{normalize_price, parse_rating};

static PRICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)["']price["']\s*:\s*["']?(\d+[.,]\d{2})"#,
        r"€\s*(\d+[.,]\d{2})",
        r"(?i)EUR\s*(\d+[.,]\d{2})",
        r"(?i)(\d+[.,]\d{2})\s*EUR",
        r"(\d+[.,]\d{2})\s*€",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static RATING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)ratingValue["']\s*:\s*["']?(\d+(?:[.,]\d+)?)"#,
        r#"(?i)rating["']\s*:\s*["']?(\d+(?:[.,]\d+)?)"#,
        r#"(?i)(\d+(?:[.,]\d+)?)["']?\s*von\s*["']?5"#,
        r"(?i)(\d+(?:[.,]\d+)?)\s*out\s+of\s*5",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// First capture group of each pattern that matches, in pattern order.
fn captures<'a>(patterns: &'a [Regex], html: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    patterns
        .iter()
        .filter_map(move |re| re.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str()))
}

/// First decimal amount next to a currency marker or a `price` key.
pub fn price_from_patterns(html: &str) -> Option<String> {
    captures(&PRICE_PATTERNS, html).find_map(normalize_price)
}

/// First rating-like number; a pattern whose capture does not parse is skipped.
pub fn rating_from_patterns(html: &str) -> Option<f64> {
    captures(&RATING_PATTERNS, html).find_map(parse_rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_key_in_inline_data() {
        let html = r#"<script>var data = {"price": "1299,00", 'price' : 12.34};</script>"#;
        assert_eq!(price_from_patterns(html).as_deref(), Some("1299.00"));
    }

    #[test]
    fn test_price_currency_markers() {
        assert_eq!(price_from_patterns("Nur € 19,99 heute").as_deref(), Some("19.99"));
        assert_eq!(price_from_patterns("EUR 7.50").as_deref(), Some("7.50"));
        assert_eq!(price_from_patterns("für 42,00 eur").as_deref(), Some("42.00"));
        assert_eq!(price_from_patterns("nur 3,49 €").as_deref(), Some("3.49"));
    }

    #[test]
    fn test_price_pattern_priority() {
        let html = "EUR 10.00 and elsewhere €5,00";
        assert_eq!(price_from_patterns(html).as_deref(), Some("5.00"));
    }

    #[test]
    fn test_no_price() {
        assert_eq!(price_from_patterns("Preis auf Anfrage"), None);
        assert_eq!(price_from_patterns("€ 19"), None);
    }

    #[test]
    fn test_rating_patterns() {
        assert_eq!(rating_from_patterns(r#""ratingValue": "4.7""#), Some(4.7));
        assert_eq!(rating_from_patterns(r#"{'rating': 3}"#), Some(3.0));
        assert_eq!(rating_from_patterns("4,5 von 5 Sternen"), Some(4.5));
        assert_eq!(rating_from_patterns("4.2 out of 5 stars"), Some(4.2));
        assert_eq!(rating_from_patterns("no stars here"), None);
    }

    #[test]
    fn test_rating_out_of_range_passes_through() {
        assert_eq!(rating_from_patterns(r#""rating": 17"#), Some(17.0));
    }
}
