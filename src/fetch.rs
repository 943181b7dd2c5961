//! Fetching Amazon product pages and running the scrape pipeline
//!
//! Network problems never surface as a failed scrape: if the page cannot be
//! fetched the listing is built from overrides and generated defaults.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::extractors::{extract_product_metadata_with, ExtractOptions, ProductMetadata};
use crate::identifier::{
    canonical_product_url, extract_asin, is_short_link_for, DEFAULT_MARKETPLACE, SHORT_LINK_HOSTS,
};
use crate::listing::{ProductListing, ProductOverrides};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for following a short link.
    pub resolve_timeout: Duration,
    /// Timeout for the product page itself.
    pub page_timeout: Duration,
    pub user_agent: String,
    pub accept_language: String,
    /// Host the canonical `/dp/<ASIN>` page is fetched from.
    pub marketplace: String,
    pub max_redirects: usize,
    /// Hosts whose links are followed to find the ASIN.
    pub short_link_hosts: Vec<String>,
    /// Overrides `https://<marketplace>` as the page origin.
    pub fetch_base: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_secs(10),
            page_timeout: Duration::from_secs(12),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "de-DE,de;q=0.9".to_string(),
            marketplace: DEFAULT_MARKETPLACE.to_string(),
            max_redirects: 10,
            short_link_hosts: SHORT_LINK_HOSTS.iter().map(|h| h.to_string()).collect(),
            fetch_base: None,
        }
    }
}

impl FetchConfig {
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn marketplace(mut self, marketplace: impl Into<String>) -> Self {
        self.marketplace = marketplace.into();
        self
    }

    pub fn short_link_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.short_link_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_short_link(&self, input: &str) -> bool {
        is_short_link_for(input, self.short_link_hosts.as_slice())
    }

    pub fn fetch_base(mut self, base: impl Into<String>) -> Self {
        self.fetch_base = Some(base.into());
        self
    }

    /// URL of the product page for `asin`.
    pub fn product_url(&self, asin: &str) -> String {
        match &self.fetch_base {
            Some(base) => format!("{}/dp/{}", base.trim_end_matches('/'), asin),
            None => canonical_product_url(asin, &self.marketplace),
        }
    }
}

pub struct ProductFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl ProductFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, config })
    }

    /// Follow redirects and return the URL they end at.
    pub async fn resolve_short_link(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.resolve_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.url().to_string())
    }

    /// GET a page with browser-like headers. Non-2xx responses are errors.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, self.config.accept_language.as_str())
            .timeout(self.config.page_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    /// Turn a link or ASIN into a complete listing.
    ///
    /// Only input without a recognisable ASIN is an error. Short links that
    /// hide the ASIN are resolved first; fetch failures fall back to
    /// [`ProductMetadata::fallback`].
    pub async fn scrape(
        &self,
        input: &str,
        overrides: &ProductOverrides,
        options: &ExtractOptions,
    ) -> Result<ProductListing, FetchError> {
        let input = input.trim();
        let mut source_url = input.to_string();

        let asin = match extract_asin(input) {
            Some(asin) => asin,
            None if self.config.is_short_link(input) => {
                match self.resolve_short_link(input).await {
                    Ok(resolved) => {
                        info!(short = input, resolved = %resolved, "resolved short link");
                        source_url = resolved;
                    }
                    Err(e) => warn!(error = %e, "could not resolve short link"),
                }
                extract_asin(&source_url)
                    .ok_or_else(|| FetchError::InvalidInput(input.to_string()))?
            }
            None => return Err(FetchError::InvalidInput(input.to_string())),
        };

        let page_url = self.config.product_url(&asin);
        info!(asin = %asin, url = %page_url, "fetching product page");

        let metadata = match self.fetch_page(&page_url).await {
            Ok(html) => {
                info!(asin = %asin, len = html.len(), "fetched product page");
                extract_product_metadata_with(&html, &asin, options)
            }
            Err(e) => {
                warn!(asin = %asin, error = %e, "scraping failed, using fallback data");
                ProductMetadata::fallback(&asin, overrides)
            }
        };

        Ok(ProductListing::assemble(
            &asin,
            &source_url,
            metadata,
            overrides,
            now_millis(),
        ))
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
