//! Merging scraped metadata with caller overrides into a storable listing.

use serde::{Deserialize, Serialize};

use crate::extractors::ProductMetadata;
use crate::identifier::clean_product_url;

pub const FALLBACK_DESCRIPTION: &str = "Entdecke dieses Produkt auf Amazon";
pub const FETCH_FAILED_DESCRIPTION: &str = "Premium-Produkt auf Amazon verfügbar";
pub const AFFILIATE_TAG_PREFIX: &str = "dropcharge-";

/// Values supplied by the operator that fill in for anything not scraped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductOverrides {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Final product record handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub asin: String,
    pub amazon_url: String,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub slug: String,
    /// Partner key the listing is promoted under.
    pub affiliate_key: Option<String>,
    /// `amazon_url` tagged with the affiliate key.
    pub affiliate_url: Option<String>,
}

impl ProductMetadata {
    /// Record used in place of a scrape when the product page could not be fetched.
    pub fn fallback(asin: &str, overrides: &ProductOverrides) -> Self {
        ProductMetadata {
            title: Some(
                overrides
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("Amazon Produkt {}", asin)),
            ),
            image: overrides.image.clone(),
            description: Some(
                overrides
                    .description
                    .clone()
                    .unwrap_or_else(|| FETCH_FAILED_DESCRIPTION.to_string()),
            ),
            price: None,
            rating: None,
        }
    }
}

impl ProductListing {
    /// Scraped values win, then overrides, then generated defaults.
    pub fn assemble(
        asin: &str,
        source_url: &str,
        scraped: ProductMetadata,
        overrides: &ProductOverrides,
        timestamp_millis: u128,
    ) -> Self {
        let title = scraped
            .title
            .or_else(|| overrides.title.clone())
            .unwrap_or_else(|| format!("Amazon ASIN: {}", asin));
        let image = scraped.image.or_else(|| overrides.image.clone());
        let description = scraped
            .description
            .or_else(|| overrides.description.clone())
            .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());

        ProductListing {
            asin: asin.to_string(),
            amazon_url: clean_product_url(source_url),
            title,
            image,
            description,
            price: scraped.price,
            rating: scraped.rating,
            slug: page_slug(asin, timestamp_millis),
            affiliate_key: None,
            affiliate_url: None,
        }
    }

    /// Attach the partner key and the tagged product link. A blank key is ignored.
    pub fn with_affiliate_key(mut self, affiliate_key: &str) -> Self {
        let key = affiliate_key.trim();
        if !key.is_empty() {
            self.affiliate_url = Some(affiliate_link(&self.amazon_url, key));
            self.affiliate_key = Some(key.to_string());
        }
        self
    }
}

/// `<asin lowercase>-<millis>`, unique enough for one operator.
pub fn page_slug(asin: &str, timestamp_millis: u128) -> String {
    format!("{}-{}", asin.to_lowercase(), timestamp_millis)
}

pub fn affiliate_link(amazon_url: &str, affiliate_key: &str) -> String {
    format!("{}?tag={}{}", amazon_url, AFFILIATE_TAG_PREFIX, affiliate_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scraped_values_win() {
        let scraped = ProductMetadata {
            title: Some("Scraped".to_string()),
            image: Some("https://example.com/s.jpg".to_string()),
            description: Some("Scraped description".to_string()),
            price: Some("9.99".to_string()),
            rating: Some(4.5),
        };
        let overrides = ProductOverrides {
            title: Some("Custom".to_string()),
            image: Some("https://example.com/c.jpg".to_string()),
            description: Some("Custom description".to_string()),
        };

        let listing = ProductListing::assemble(
            "B07FZG4C8F",
            "https://www.amazon.de/dp/B07FZG4C8F?tag=old#x",
            scraped,
            &overrides,
            1700000000000,
        );

        assert_eq!(
            listing,
            ProductListing {
                asin: "B07FZG4C8F".to_string(),
                amazon_url: "https://www.amazon.de/dp/B07FZG4C8F".to_string(),
                title: "Scraped".to_string(),
                image: Some("https://example.com/s.jpg".to_string()),
                description: "Scraped description".to_string(),
                price: Some("9.99".to_string()),
                rating: Some(4.5),
                slug: "b07fzg4c8f-1700000000000".to_string(),
                affiliate_key: None,
                affiliate_url: None,
            }
        );
    }

    #[test]
    fn test_overrides_fill_gaps() {
        let overrides = ProductOverrides {
            title: Some("Custom".to_string()),
            image: None,
            description: None,
        };
        let listing = ProductListing::assemble(
            "B07FZG4C8F",
            "B07FZG4C8F",
            ProductMetadata::default(),
            &overrides,
            1,
        );

        assert_eq!(listing.title, "Custom");
        assert_eq!(listing.image, None);
        assert_eq!(listing.description, FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_generated_defaults() {
        let listing = ProductListing::assemble(
            "B07FZG4C8F",
            "https://amzn.to/abc",
            ProductMetadata::default(),
            &ProductOverrides::default(),
            1,
        );
        assert_eq!(listing.title, "Amazon ASIN: B07FZG4C8F");
        assert_eq!(listing.description, FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_fetch_failure_fallback() {
        let fallback = ProductMetadata::fallback("B07FZG4C8F", &ProductOverrides::default());
        assert_eq!(fallback.title.as_deref(), Some("Amazon Produkt B07FZG4C8F"));
        assert_eq!(fallback.description.as_deref(), Some(FETCH_FAILED_DESCRIPTION));
        assert_eq!(fallback.image, None);
        assert_eq!(fallback.price, None);
    }

    #[test]
    fn test_affiliate_key_tags_listing_url() {
        let listing = ProductListing::assemble(
            "B07FZG4C8F",
            "https://www.amazon.de/dp/B07FZG4C8F?tag=someone-else",
            ProductMetadata::default(),
            &ProductOverrides::default(),
            1,
        )
        .with_affiliate_key(" abc ");

        assert_eq!(listing.affiliate_key.as_deref(), Some("abc"));
        assert_eq!(
            listing.affiliate_url.as_deref(),
            Some("https://www.amazon.de/dp/B07FZG4C8F?tag=dropcharge-abc")
        );
    }

    #[test]
    fn test_blank_affiliate_key_is_ignored() {
        let listing = ProductListing::assemble(
            "B07FZG4C8F",
            "B07FZG4C8F",
            ProductMetadata::default(),
            &ProductOverrides::default(),
            1,
        )
        .with_affiliate_key("   ");

        assert_eq!(listing.affiliate_key, None);
        assert_eq!(listing.affiliate_url, None);
    }
}
