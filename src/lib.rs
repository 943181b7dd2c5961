//! Amazon product page parser for affiliate landing pages
//!
//! - ASIN recognition from links, short links and bare identifiers
//! - Metadata extraction (title, image, description, price, rating) from
//!   OpenGraph, meta tags, JSON-LD and page-text fallbacks
//! - Fetch pipeline that always produces a usable listing
//! - FFI interface returning JSON

pub mod entities;
pub mod error;
pub mod extractors;
pub mod fetch;
pub mod ffi;
pub mod identifier;
pub mod listing;

pub use entities::decode_entities;
pub use error::FetchError;
pub use extractors::{
    extract_product_metadata, extract_product_metadata_with, ExtractOptions, ProductMetadata,
};
pub use fetch::{FetchConfig, ProductFetcher};
pub use ffi::*;
pub use identifier::extract_asin;
pub use listing::{ProductListing, ProductOverrides};
