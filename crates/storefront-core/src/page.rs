//! Cursor-pagination primitives.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::product::ProductRecord;

/// Relay-style pagination info from provider responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Cursor positioned after the last item of the page. Opaque: threaded
    /// forward on the next request, never parsed.
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Parse page info from a provider connection value.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(v) = value else {
            return Self::default();
        };
        Self {
            has_next_page: v
                .get("hasNextPage")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            end_cursor: v
                .get("endCursor")
                .and_then(Value::as_str)
                .map(String::from),
        }
    }
}

/// One page of full product records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<ProductRecord>,
    pub page_info: PageInfo,
}

impl ProductPage {
    /// Parse a page from a `products` connection value.
    ///
    /// A null or absent connection (the empty-success transport path)
    /// parses as an empty page with no next cursor.
    pub fn from_connection(connection: Option<&Value>) -> Self {
        let Some(conn) = connection.filter(|c| !c.is_null()) else {
            return Self::default();
        };
        let products = conn
            .get("edges")
            .and_then(Value::as_array)
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|edge| edge.get("node"))
                    .filter_map(ProductRecord::from_value)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            products,
            page_info: PageInfo::from_value(conn.get("pageInfo")),
        }
    }
}

/// One page of edge cursors only, used for offset resolution.
#[derive(Debug, Clone, Default)]
pub struct CursorPage {
    pub cursors: Vec<String>,
    pub page_info: PageInfo,
}

impl CursorPage {
    /// Parse a cursors-only page from a `products` connection value.
    pub fn from_connection(connection: Option<&Value>) -> Self {
        let Some(conn) = connection.filter(|c| !c.is_null()) else {
            return Self::default();
        };
        let cursors = conn
            .get("edges")
            .and_then(Value::as_array)
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|edge| edge.get("cursor"))
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            cursors,
            page_info: PageInfo::from_value(conn.get("pageInfo")),
        }
    }

    /// Cursor of the last edge on this page.
    pub fn last_cursor(&self) -> Option<&str> {
        self.cursors.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_info_defaults() {
        let info = PageInfo::from_value(None);
        assert!(!info.has_next_page);
        assert!(info.end_cursor.is_none());
    }

    #[test]
    fn test_product_page_parsing() {
        let conn = json!({
            "edges": [
                { "cursor": "c1", "node": { "id": "p1", "title": "One" } },
                { "cursor": "c2", "node": { "id": "p2", "title": "Two" } },
                { "cursor": "c3", "node": { "title": "no id, skipped" } }
            ],
            "pageInfo": { "hasNextPage": true, "endCursor": "c3" }
        });
        let page = ProductPage::from_connection(Some(&conn));
        assert_eq!(page.products.len(), 2);
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("c3"));
    }

    #[test]
    fn test_null_connection_is_empty_page() {
        let page = ProductPage::from_connection(Some(&Value::Null));
        assert!(page.products.is_empty());
        assert!(!page.page_info.has_next_page);
    }

    #[test]
    fn test_cursor_page_parsing() {
        let conn = json!({
            "edges": [ { "cursor": "a" }, { "cursor": "b" } ],
            "pageInfo": { "hasNextPage": false }
        });
        let page = CursorPage::from_connection(Some(&conn));
        assert_eq!(page.cursors, vec!["a", "b"]);
        assert_eq!(page.last_cursor(), Some("b"));
    }
}
