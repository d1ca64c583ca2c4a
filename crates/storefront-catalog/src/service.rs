//! The storefront-facing catalog API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::FutureExt;
use serde_json::json;

use storefront_cache::{CacheService, CacheStats, JanitorHandle};
use storefront_core::{ProductPage, ProductRecord, StoreConfig};
use storefront_transport::GraphqlClient;

use crate::segments;
use crate::snapshot::{self, BATCH_DELAY, SNAPSHOT_BATCH};
use crate::source::{GraphqlProductSource, ProductPageSource};
use crate::walker::PaginationWalker;

/// Cache tag covering the full snapshot and the count.
pub const TAG_CATALOG: &str = "catalog";
/// Cache tag covering derived segment views.
pub const TAG_SEGMENTS: &str = "segments";

const SNAPSHOT_KEY: &str = "catalog:snapshot";
const COUNT_KEY: &str = "catalog:count";

/// Snapshot TTL in the tagged layer. Long: segments recompute on their own
/// shorter TTL without forcing a full re-fetch.
const SNAPSHOT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Segment and count TTL, bounding derived-view staleness separately from
/// raw catalog staleness.
const SEGMENT_TTL: Duration = Duration::from_secs(60 * 60);

/// Catalog fetch orchestrator.
///
/// Every public method upholds the consumer contract: it returns the
/// requested shape or its documented safe default, and never an error.
/// Failures are logged and recovered here, at the outermost boundary.
pub struct CatalogService {
    source: Arc<dyn ProductPageSource>,
    cache: Arc<CacheService>,
    walker: PaginationWalker,
}

impl CatalogService {
    /// Build the production service from explicit store configuration.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let cache = Arc::new(CacheService::new());
        let transport = Arc::new(GraphqlClient::new(config)?);
        let source = Arc::new(GraphqlProductSource::new(transport, Arc::clone(&cache)));
        Ok(Self::from_parts(source, cache))
    }

    /// Build the production service from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::new(StoreConfig::from_env())
    }

    /// Assemble a service from an explicit source and cache service.
    pub fn from_parts(source: Arc<dyn ProductPageSource>, cache: Arc<CacheService>) -> Self {
        Self {
            source,
            cache,
            walker: PaginationWalker::provider_default(),
        }
    }

    /// The cache service backing this instance.
    pub fn cache(&self) -> &Arc<CacheService> {
        &self.cache
    }

    /// Start the periodic cache janitor. Call once from a long-lived
    /// process entry point; short-lived contexts skip this entirely.
    pub fn start_janitor(&self) -> JanitorHandle {
        self.cache.start_janitor()
    }

    /// Drop every cache entry under `tag`.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        self.cache.tagged().invalidate_tag(tag)
    }

    /// Drop all cached state.
    pub fn reset(&self) {
        self.cache.reset();
    }

    /// Memory-layer statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The complete catalog snapshot.
    ///
    /// Memoized in the hot memory layer and, for cross-request reuse,
    /// in the tagged layer for 24 hours. Concurrent callers share one
    /// assembly walk through the dedup registry. Returns an empty list
    /// when nothing could be fetched.
    pub async fn all_products(&self) -> Vec<ProductRecord> {
        if let Some(value) = self.cache.memory().get(SNAPSHOT_KEY) {
            if let Ok(products) = serde_json::from_value(value) {
                return products;
            }
        }
        if let Some(value) = self.cache.tagged().get(SNAPSHOT_KEY) {
            if let Ok(products) = serde_json::from_value::<Vec<ProductRecord>>(value.clone()) {
                self.cache.memory().insert(SNAPSHOT_KEY, value);
                return products;
            }
        }

        let source = Arc::clone(&self.source);
        let result = self
            .cache
            .dedup()
            .run(SNAPSHOT_KEY, move || {
                async move {
                    let products =
                        snapshot::assemble(source.as_ref(), SNAPSHOT_BATCH, BATCH_DELAY).await;
                    Ok(serde_json::to_value(&products).unwrap_or_else(|_| json!([])))
                }
                .boxed()
            })
            .await;

        match result {
            Ok(value) => {
                let products: Vec<ProductRecord> =
                    serde_json::from_value(value.clone()).unwrap_or_default();
                if !products.is_empty() {
                    self.cache
                        .tagged()
                        .insert(SNAPSHOT_KEY, value.clone(), SNAPSHOT_TTL, &[TAG_CATALOG]);
                    self.cache.memory().insert(SNAPSHOT_KEY, value);
                }
                products
            }
            Err(error) => {
                tracing::error!(%error, "snapshot assembly failed");
                Vec::new()
            }
        }
    }

    /// One UI page of products at `page_size`, emulating offset pagination
    /// over the cursor-only provider API. Page numbers are 1-based.
    pub async fn products_page(&self, page: usize, page_size: usize) -> ProductPage {
        let target = page.saturating_sub(1).saturating_mul(page_size);
        match self.try_products_page(target, page_size).await {
            Ok(result) => result,
            Err(error) => {
                tracing::error!(%error, page, "paged catalog fetch failed");
                ProductPage::default()
            }
        }
    }

    async fn try_products_page(&self, target: usize, page_size: usize) -> Result<ProductPage> {
        let cursor = self
            .walker
            .cursor_for_offset(self.source.as_ref(), target)
            .await?;
        self.source
            .product_page(page_size, cursor.as_deref())
            .await
    }

    /// Single-product lookup by handle. `None` covers both "not found"
    /// and any fetch failure.
    pub async fn product_by_handle(&self, handle: &str) -> Option<ProductRecord> {
        match self.source.product_by_handle(handle).await {
            Ok(found) => found,
            Err(error) => {
                tracing::error!(%error, handle, "product lookup failed");
                None
            }
        }
    }

    /// Approximate total product count via a capped cursor walk,
    /// cached for an hour.
    pub async fn product_count(&self) -> usize {
        if let Some(value) = self.cache.tagged().get(COUNT_KEY) {
            if let Some(count) = value.as_u64() {
                return count as usize;
            }
        }
        match self.walker.approximate_count(self.source.as_ref()).await {
            Ok(count) => {
                self.cache
                    .tagged()
                    .insert(COUNT_KEY, json!(count), SEGMENT_TTL, &[TAG_CATALOG]);
                count
            }
            Err(error) => {
                tracing::error!(%error, "product count walk failed");
                0
            }
        }
    }

    /// Products tagged as best sellers.
    pub async fn best_sellers(&self, limit: usize) -> Vec<ProductRecord> {
        self.cached_segment(format!("segment:best-sellers:{limit}"), |snap| {
            segments::best_sellers(snap, limit)
        })
        .await
    }

    /// Products with a discounted variant.
    pub async fn on_sale(&self, limit: usize) -> Vec<ProductRecord> {
        self.cached_segment(format!("segment:on-sale:{limit}"), |snap| {
            segments::on_sale(snap, limit)
        })
        .await
    }

    /// Most recently published products.
    pub async fn latest(&self, limit: usize) -> Vec<ProductRecord> {
        self.cached_segment(format!("segment:latest:{limit}"), |snap| {
            segments::latest(snap, limit)
        })
        .await
    }

    /// Other products in the same category, excluding the current one.
    ///
    /// The cached candidate list is keyed by category alone; exclusion and
    /// limit apply per call so one entry serves every product in the
    /// category.
    pub async fn same_category(
        &self,
        current_id: &str,
        category: &str,
        limit: usize,
    ) -> Vec<ProductRecord> {
        let candidates = self
            .cached_segment(format!("segment:category:{category}"), |snap| {
                segments::category_candidates(snap, category)
            })
            .await;
        candidates
            .into_iter()
            .filter(|p| p.id != current_id)
            .take(limit)
            .collect()
    }

    /// Products sharing tags with the given list, ranked by overlap and
    /// excluding the current one. The key uses the sorted tag list, so
    /// permutations of one query share a cache entry.
    pub async fn similar_by_tags(
        &self,
        current_id: &str,
        tags: &[String],
        limit: usize,
    ) -> Vec<ProductRecord> {
        if tags.is_empty() {
            return Vec::new();
        }
        let key = format!("segment:tags:{}", segments::tag_cache_key(tags));
        let owned_tags = tags.to_vec();
        let candidates = self
            .cached_segment(key, move |snap| {
                segments::tag_similarity_candidates(snap, &owned_tags)
            })
            .await;
        candidates
            .into_iter()
            .filter(|p| p.id != current_id)
            .take(limit)
            .collect()
    }

    /// Deterministic pseudo-random picks excluding the current product.
    ///
    /// Stride-sampled, not random: the same `(current_id, limit)` pair
    /// reproduces the identical ordering while its cache entry lives.
    pub async fn random_picks(&self, current_id: &str, limit: usize) -> Vec<ProductRecord> {
        self.cached_segment(format!("segment:random:{current_id}:{limit}"), |snap| {
            segments::deterministic_sample(snap, current_id, limit)
        })
        .await
    }

    /// Read-through for one derived view: tagged-cache lookup, then
    /// snapshot + derivation on miss. A derivation problem degrades to an
    /// empty list without touching the shared snapshot entry.
    async fn cached_segment<F>(&self, key: String, derive: F) -> Vec<ProductRecord>
    where
        F: FnOnce(&[ProductRecord]) -> Vec<ProductRecord>,
    {
        if let Some(value) = self.cache.tagged().get(&key) {
            if let Ok(cached) = serde_json::from_value(value) {
                return cached;
            }
        }

        let snapshot = self.all_products().await;
        let derived = derive(&snapshot);

        match serde_json::to_value(&derived) {
            Ok(value) => {
                self.cache
                    .tagged()
                    .insert(key.as_str(), value, SEGMENT_TTL, &[TAG_SEGMENTS]);
            }
            Err(error) => {
                tracing::error!(%error, key = %key, "segment serialization failed");
            }
        }
        derived
    }
}
