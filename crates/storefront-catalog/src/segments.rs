//! Pure, bounded derivations over a catalog snapshot.
//!
//! Every function here is filter → sort (where applicable) → truncate.
//! None of them touch the network or the caches; the service layer owns
//! key derivation and caching for each derived view.

use storefront_core::ProductRecord;

/// Default number of items per segment.
pub const DEFAULT_SEGMENT_LIMIT: usize = 8;

/// Tag marking a product as a best seller.
pub const BEST_SELLER_TAG: &str = "best-seller";

/// Products tagged as best sellers, in snapshot order.
pub fn best_sellers(snapshot: &[ProductRecord], limit: usize) -> Vec<ProductRecord> {
    snapshot
        .iter()
        .filter(|p| p.has_tag(BEST_SELLER_TAG))
        .take(limit)
        .cloned()
        .collect()
}

/// Products with at least one discounted variant, in snapshot order.
pub fn on_sale(snapshot: &[ProductRecord], limit: usize) -> Vec<ProductRecord> {
    snapshot
        .iter()
        .filter(|p| p.variants.on_sale)
        .take(limit)
        .cloned()
        .collect()
}

/// Most recently published products first. Records without a publication
/// timestamp sort last.
pub fn latest(snapshot: &[ProductRecord], limit: usize) -> Vec<ProductRecord> {
    let mut dated: Vec<&ProductRecord> = snapshot.iter().collect();
    dated.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    dated.into_iter().take(limit).cloned().collect()
}

/// All products of one category, in snapshot order.
///
/// Candidates only: the caller excludes the current product and applies
/// the limit after its cache lookup, so one cached list per category
/// serves every product page in that category.
pub fn category_candidates(snapshot: &[ProductRecord], category: &str) -> Vec<ProductRecord> {
    snapshot
        .iter()
        .filter(|p| p.product_type == category)
        .cloned()
        .collect()
}

/// Products sharing at least one tag with `tags`, ranked by shared-tag
/// count descending. Ties keep snapshot order. Candidates only, like
/// [`category_candidates`].
pub fn tag_similarity_candidates(
    snapshot: &[ProductRecord],
    tags: &[String],
) -> Vec<ProductRecord> {
    let mut matched: Vec<(usize, &ProductRecord)> = snapshot
        .iter()
        .map(|p| (p.shared_tag_count(tags), p))
        .filter(|(shared, _)| *shared > 0)
        .collect();
    matched.sort_by(|a, b| b.0.cmp(&a.0));
    matched.into_iter().map(|(_, p)| p.clone()).collect()
}

/// Cache-key fragment for a tag list: sorted and hyphen-joined, so
/// tag-order permutations of the same query share one cache entry.
pub fn tag_cache_key(tags: &[String]) -> String {
    let mut sorted: Vec<&str> = tags.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join("-")
}

/// Deterministic stride sample excluding the current product.
///
/// Despite the "random" name upstream, this is fixed-stride selection:
/// `step = max(1, filtered_len / limit)`, walking the filtered list from
/// the front and backfilling from the front when the stride collects
/// fewer than `limit`. Identical inputs always reproduce the identical
/// ordering; cached results depend on that, so do not replace this with
/// actual randomness.
pub fn deterministic_sample(
    snapshot: &[ProductRecord],
    current_id: &str,
    limit: usize,
) -> Vec<ProductRecord> {
    if limit == 0 {
        return Vec::new();
    }
    let filtered: Vec<&ProductRecord> =
        snapshot.iter().filter(|p| p.id != current_id).collect();
    if filtered.is_empty() {
        return Vec::new();
    }

    let step = (filtered.len() / limit).max(1);
    let mut picked: Vec<ProductRecord> = Vec::with_capacity(limit);
    let mut index = 0;
    while index < filtered.len() && picked.len() < limit {
        picked.push(filtered[index].clone());
        index += step;
    }

    // Backfill from the front when the stride came up short.
    let mut front = 0;
    while picked.len() < limit && front < filtered.len() {
        if !picked.iter().any(|p| p.id == filtered[front].id) {
            picked.push(filtered[front].clone());
        }
        front += 1;
    }

    picked
}
