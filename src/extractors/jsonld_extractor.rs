//! JSON-LD extraction from HTML
//!
//! Reads every `<script type="application/ld+json">` block in document order.
//! Blocks that fail to parse are skipped; the rest are flattened into a list of
//! nodes (top-level object, top-level array items, `@graph` items).

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::{non_empty, normalize_price, parse_rating};

#[derive(Debug, Clone, Default)]
pub struct StructuredData {
    nodes: Vec<Value>,
}

impl StructuredData {
    pub fn from_document(document: &Html) -> Self {
        let mut data = StructuredData::default();

        let selector = match Selector::parse(r#"script[type="application/ld+json"]"#) {
            Ok(s) => s,
            Err(_) => return data,
        };

        for (index, element) in document.select(&selector).enumerate() {
            let text = element.text().collect::<String>();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(trimmed) {
                Ok(json) => collect_nodes(json, &mut data.nodes),
                Err(e) => debug!(block = index, error = %e, "skipping unparsable JSON-LD block"),
            }
        }

        data
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self) -> Option<String> {
        self.first(|node| node.get("name")?.as_str().and_then(non_empty))
    }

    pub fn description(&self) -> Option<String> {
        self.first(|node| node.get("description")?.as_str().and_then(non_empty))
    }

    /// `image` as a string, the first array element, or an object's `url`.
    pub fn image(&self) -> Option<String> {
        self.first(|node| image_value(node.get("image")?))
    }

    /// `offers.price`, taking the first offer when `offers` is an array.
    pub fn offer_price(&self) -> Option<String> {
        self.first(|node| {
            let offers = node.get("offers")?;
            let offer = match offers {
                Value::Array(items) => items.first()?,
                other => other,
            };
            match offer.get("price")? {
                Value::String(s) => normalize_price(s),
                Value::Number(n) => normalize_price(&n.to_string()),
                _ => None,
            }
        })
    }

    pub fn rating_value(&self) -> Option<f64> {
        self.first(|node| match node.get("aggregateRating")?.get("ratingValue")? {
            Value::String(s) => parse_rating(s),
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
    }

    fn first<T>(&self, f: impl Fn(&Value) -> Option<T>) -> Option<T> {
        self.nodes.iter().find_map(f)
    }
}

fn collect_nodes(value: Value, nodes: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                if item.is_object() {
                    nodes.push(item);
                }
            }
        }
        Value::Object(mut obj) => {
            let graph = obj.remove("@graph");
            nodes.push(Value::Object(obj));
            if let Some(Value::Array(items)) = graph {
                for item in items {
                    if item.is_object() {
                        nodes.push(item);
                    }
                }
            }
        }
        _ => {}
    }
}

fn image_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Array(items) => image_value(items.first()?),
        Value::Object(obj) => obj.get("url")?.as_str().and_then(non_empty),
        _ => None,
    }
}
