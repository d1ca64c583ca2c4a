//! Product page sources: the seam between orchestration and transport.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{json, Value};

use storefront_cache::CacheService;
use storefront_core::{CursorPage, ProductPage, ProductRecord};
use storefront_transport::GraphqlClient;

/// Cache tag covering raw product-list fetches.
pub const TAG_PRODUCTS: &str = "products";
/// Cache tag covering single-product lookups.
pub const TAG_PRODUCT: &str = "product";

/// TTL for raw query results in the tagged layer.
const QUERY_TTL: Duration = Duration::from_secs(60 * 60);

const PRODUCT_FIELDS: &str = r#"
    id
    handle
    title
    productType
    vendor
    tags
    availableForSale
    publishedAt
    variantsCount { count }
    priceRange {
        minVariantPrice { amount currencyCode }
        maxVariantPrice { amount currencyCode }
    }
    compareAtPriceRange {
        minVariantPrice { amount currencyCode }
    }
"#;

fn products_page_query() -> String {
    format!(
        r#"
        query ProductsPage($first: Int!, $after: String) {{
            products(first: $first, after: $after) {{
                edges {{
                    cursor
                    node {{ {PRODUCT_FIELDS} }}
                }}
                pageInfo {{ hasNextPage endCursor }}
            }}
        }}
        "#
    )
}

const PRODUCT_CURSORS_QUERY: &str = r#"
    query ProductCursors($first: Int!, $after: String) {
        products(first: $first, after: $after) {
            edges { cursor }
            pageInfo { hasNextPage endCursor }
        }
    }
"#;

fn product_by_handle_query() -> String {
    format!(
        r#"
        query ProductByHandle($handle: String!) {{
            product(handle: $handle) {{ {PRODUCT_FIELDS} }}
        }}
        "#
    )
}

/// A source of catalog pages.
///
/// The walker and snapshot assembly depend on this seam rather than on the
/// transport directly, so tests drive them with scripted fakes.
#[async_trait]
pub trait ProductPageSource: Send + Sync {
    /// Fetch one page of full product records.
    async fn product_page(&self, first: usize, after: Option<&str>) -> Result<ProductPage>;

    /// Fetch one page of edge cursors only.
    async fn cursor_page(&self, first: usize, after: Option<&str>) -> Result<CursorPage>;

    /// Look up a single product by handle.
    async fn product_by_handle(&self, handle: &str) -> Result<Option<ProductRecord>>;
}

/// The production source: GraphQL transport behind the tagged cache and
/// the dedup registry.
///
/// Every raw request is keyed by query + canonically-serialized variables.
/// The registry is consulted before the transport call: a cache check and
/// a fetch span an await, so only the registry closes the double-fetch
/// window for concurrent identical requests.
pub struct GraphqlProductSource {
    transport: Arc<GraphqlClient>,
    cache: Arc<CacheService>,
}

impl GraphqlProductSource {
    /// Create a source over a transport client and cache service.
    pub fn new(transport: Arc<GraphqlClient>, cache: Arc<CacheService>) -> Self {
        Self { transport, cache }
    }

    /// Execute a GraphQL query through the read-through tagged cache.
    ///
    /// The result is cached under the given tags for `ttl`; while a fetch
    /// for the same query and variables is in flight, concurrent callers
    /// share it instead of issuing their own.
    pub async fn execute_cached(
        &self,
        query: String,
        variables: Value,
        tags: &[&str],
        ttl: Duration,
    ) -> Result<Value> {
        let key = request_key(&query, &variables);

        if let Some(hit) = self.cache.tagged().get(&key) {
            return Ok(hit);
        }

        let transport = Arc::clone(&self.transport);
        let result = self
            .cache
            .dedup()
            .run(&key, move || {
                async move {
                    transport
                        .execute(&query, variables)
                        .await
                        .map_err(|e| Arc::new(anyhow::Error::new(e)))
                }
                .boxed()
            })
            .await;

        match result {
            Ok(value) => {
                self.cache.tagged().insert(key.as_str(), value.clone(), ttl, tags);
                Ok(value)
            }
            Err(error) => Err(anyhow::anyhow!("{error}")),
        }
    }
}

#[async_trait]
impl ProductPageSource for GraphqlProductSource {
    async fn product_page(&self, first: usize, after: Option<&str>) -> Result<ProductPage> {
        let variables = json!({ "first": first as u64, "after": after });
        let data = self
            .execute_cached(products_page_query(), variables, &[TAG_PRODUCTS], QUERY_TTL)
            .await?;
        Ok(ProductPage::from_connection(data.get("products")))
    }

    async fn cursor_page(&self, first: usize, after: Option<&str>) -> Result<CursorPage> {
        let variables = json!({ "first": first as u64, "after": after });
        let data = self
            .execute_cached(
                PRODUCT_CURSORS_QUERY.to_string(),
                variables,
                &[TAG_PRODUCTS],
                QUERY_TTL,
            )
            .await?;
        Ok(CursorPage::from_connection(data.get("products")))
    }

    async fn product_by_handle(&self, handle: &str) -> Result<Option<ProductRecord>> {
        let variables = json!({ "handle": handle });
        let data = self
            .execute_cached(product_by_handle_query(), variables, &[TAG_PRODUCT], QUERY_TTL)
            .await?;
        Ok(data.get("product").and_then(ProductRecord::from_value))
    }
}

/// Canonical request key: query text plus serialized variables.
///
/// `serde_json` object keys are ordered, so semantically identical
/// variable maps serialize identically.
fn request_key(query: &str, variables: &Value) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    query.hash(&mut hasher);
    variables.to_string().hash(&mut hasher);
    format!("gql:{:x}", hasher.finish())
}
