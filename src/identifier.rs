//! ASIN recognition and Amazon URL helpers

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub const DEFAULT_MARKETPLACE: &str = "www.amazon.de";

static BARE_ASIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[A-Z0-9]{10}$").unwrap());

/// Recognisers tried after the bare-ASIN check, in priority order.
static ASIN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)/dp/([A-Z0-9]{10})",
        r"(?i)/gp/product/([A-Z0-9]{10})",
        r"(?i)(B[A-Z0-9]{9})",
        r"(?i)[?&]asin[=:]([A-Z0-9]{10})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Extract the 10-character product identifier from a bare ASIN, a product
/// URL or a link that merely contains one. The result is always uppercase.
pub fn extract_asin(input: &str) -> Option<String> {
    let input = input.trim();

    if BARE_ASIN_RE.is_match(input) {
        return Some(input.to_uppercase());
    }

    ASIN_PATTERNS.iter().find_map(|re| {
        re.captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_uppercase())
    })
}

/// Hosts of Amazon's link shorteners.
pub const SHORT_LINK_HOSTS: &[&str] = &["amzn.to", "amzn.eu"];

/// Whether the URL points at one of Amazon's link shorteners.
pub fn is_short_link(input: &str) -> bool {
    is_short_link_for(input, SHORT_LINK_HOSTS)
}

/// Whether the URL's host is one of `hosts` (ASCII case-insensitive).
pub fn is_short_link_for<S: AsRef<str>>(input: &str, hosts: &[S]) -> bool {
    match Url::parse(input.trim()) {
        Ok(url) => url.host_str().is_some_and(|host| {
            hosts
                .iter()
                .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(host))
        }),
        Err(_) => false,
    }
}

/// Product page URL on the given marketplace host, e.g. `www.amazon.de`.
pub fn canonical_product_url(asin: &str, marketplace: &str) -> String {
    format!("https://{}/dp/{}", marketplace, asin)
}

/// Drop query string and fragment so tracking parameters are not stored.
pub fn clean_product_url(input: &str) -> String {
    let trimmed = input.trim();
    let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
    trimmed[..end].to_string()
}
