//! Catalog item types and lenient JSON extraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Price bounds across a product's variants, in minor units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Cheapest variant price.
    pub min_cents: i64,
    /// Most expensive variant price.
    pub max_cents: i64,
    /// ISO currency code as reported by the provider.
    pub currency: String,
    /// Cheapest compare-at price, when the provider reports one.
    pub compare_at_min_cents: Option<i64>,
}

impl PriceRange {
    /// Whether the cheapest variant is discounted against its compare-at price.
    pub fn is_discounted(&self) -> bool {
        self.compare_at_min_cents
            .map(|cap| cap > self.min_cents)
            .unwrap_or(false)
    }
}

/// Aggregate variant information carried on the record so segment
/// predicates never need a second fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSummary {
    /// Number of variants.
    pub count: u32,
    /// Whether any variant is available for sale.
    pub available: bool,
    /// Whether any variant is currently discounted.
    pub on_sale: bool,
}

/// One catalog item as assembled into a snapshot.
///
/// Snapshot ordering is provider-defined (creation order) and is the sole
/// ordering basis for deterministic sampling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Provider-issued opaque identifier.
    pub id: String,
    /// URL-friendly handle (unique).
    pub handle: String,
    /// Display title.
    pub title: String,
    /// Provider-side category string.
    pub product_type: String,
    /// Vendor name.
    pub vendor: String,
    /// Tags for filtering and similarity ranking.
    pub tags: Vec<String>,
    /// Price bounds across variants.
    pub price_range: PriceRange,
    /// Variant aggregate.
    pub variants: VariantSummary,
    /// Publication timestamp, when reported.
    pub published_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    /// Parse a record from a provider product node.
    ///
    /// Extraction is lenient: missing scalar fields default rather than
    /// failing the whole page. Returns `None` only when the node has no id.
    pub fn from_value(node: &Value) -> Option<Self> {
        let id = node.get("id").and_then(Value::as_str)?.to_string();

        let tags = node
            .get("tags")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let price_range = parse_price_range(node);
        let on_sale = price_range.is_discounted();

        let variants = VariantSummary {
            count: node
                .get("variantsCount")
                .and_then(|c| c.get("count"))
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
            available: node
                .get("availableForSale")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            on_sale,
        };

        let published_at = node
            .get("publishedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Self {
            id,
            handle: str_field(node, "handle"),
            title: str_field(node, "title"),
            product_type: str_field(node, "productType"),
            vendor: str_field(node, "vendor"),
            tags,
            price_range,
            variants,
            published_at,
        })
    }

    /// Whether the record carries the given tag (case-sensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Number of tags shared with `other`.
    pub fn shared_tag_count(&self, other: &[String]) -> usize {
        self.tags.iter().filter(|t| other.contains(t)).count()
    }
}

fn str_field(node: &Value, key: &str) -> String {
    node.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_price_range(node: &Value) -> PriceRange {
    let range = node.get("priceRange");
    let min = range.and_then(|r| r.get("minVariantPrice"));
    let max = range.and_then(|r| r.get("maxVariantPrice"));

    let compare_at_min = node
        .get("compareAtPriceRange")
        .and_then(|r| r.get("minVariantPrice"))
        .and_then(parse_money);

    PriceRange {
        min_cents: min.and_then(parse_money).unwrap_or(0),
        max_cents: max.and_then(parse_money).unwrap_or(0),
        currency: min
            .and_then(|m| m.get("currencyCode"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        // A zero compare-at amount means "no compare-at price" upstream.
        compare_at_min_cents: compare_at_min.filter(|cents| *cents > 0),
    }
}

fn parse_money(money: &Value) -> Option<i64> {
    money
        .get("amount")
        .and_then(Value::as_str)
        .and_then(parse_amount_cents)
}

/// Parse a decimal amount string ("29.99") into minor units without
/// going through floating point.
fn parse_amount_cents(amount: &str) -> Option<i64> {
    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };
    let int: i64 = int_part.parse().ok()?;
    let mut frac_digits = String::from(frac_part);
    frac_digits.truncate(2);
    while frac_digits.len() < 2 {
        frac_digits.push('0');
    }
    let frac: i64 = frac_digits.parse().ok()?;
    Some(int * 100 + frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_node() -> Value {
        json!({
            "id": "gid://catalog/Product/1",
            "handle": "blue-shirt",
            "title": "Blue Shirt",
            "productType": "Shirts",
            "vendor": "Acme",
            "tags": ["summer", "best-seller"],
            "availableForSale": true,
            "publishedAt": "2024-03-01T12:00:00Z",
            "variantsCount": { "count": 3 },
            "priceRange": {
                "minVariantPrice": { "amount": "29.99", "currencyCode": "USD" },
                "maxVariantPrice": { "amount": "39.99", "currencyCode": "USD" }
            },
            "compareAtPriceRange": {
                "minVariantPrice": { "amount": "49.99", "currencyCode": "USD" }
            }
        })
    }

    #[test]
    fn test_parse_full_record() {
        let record = ProductRecord::from_value(&sample_node()).unwrap();
        assert_eq!(record.handle, "blue-shirt");
        assert_eq!(record.price_range.min_cents, 2999);
        assert_eq!(record.price_range.max_cents, 3999);
        assert_eq!(record.price_range.compare_at_min_cents, Some(4999));
        assert_eq!(record.variants.count, 3);
        assert!(record.variants.available);
        assert!(record.variants.on_sale);
        assert!(record.has_tag("best-seller"));
        assert!(record.published_at.is_some());
    }

    #[test]
    fn test_parse_requires_id() {
        assert!(ProductRecord::from_value(&json!({ "handle": "x" })).is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let record = ProductRecord::from_value(&json!({ "id": "p1" })).unwrap();
        assert_eq!(record.title, "");
        assert!(record.tags.is_empty());
        assert_eq!(record.price_range.min_cents, 0);
        assert!(!record.variants.on_sale);
        assert!(record.published_at.is_none());
    }

    #[test]
    fn test_amount_parsing_avoids_float_drift() {
        assert_eq!(parse_amount_cents("29.99"), Some(2999));
        assert_eq!(parse_amount_cents("100"), Some(10000));
        assert_eq!(parse_amount_cents("0.5"), Some(50));
        assert_eq!(parse_amount_cents("12.345"), Some(1234));
        assert_eq!(parse_amount_cents("abc"), None);
    }

    #[test]
    fn test_zero_compare_at_is_not_a_discount() {
        let node = json!({
            "id": "p1",
            "priceRange": {
                "minVariantPrice": { "amount": "10.00", "currencyCode": "USD" },
                "maxVariantPrice": { "amount": "10.00", "currencyCode": "USD" }
            },
            "compareAtPriceRange": {
                "minVariantPrice": { "amount": "0.0", "currencyCode": "USD" }
            }
        });
        let record = ProductRecord::from_value(&node).unwrap();
        assert_eq!(record.price_range.compare_at_min_cents, None);
        assert!(!record.variants.on_sale);
    }

    #[test]
    fn test_shared_tag_count() {
        let record = ProductRecord::from_value(&sample_node()).unwrap();
        let query = vec!["summer".to_string(), "winter".to_string()];
        assert_eq!(record.shared_tag_count(&query), 1);
    }
}
