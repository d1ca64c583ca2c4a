//! Fail-soft assembly of the complete catalog.

use std::time::Duration;

use crate::source::ProductPageSource;
use storefront_core::ProductRecord;

/// Batch size for snapshot assembly. Deliberately below the provider page
/// cap to keep individual responses small.
pub const SNAPSHOT_BATCH: usize = 50;

/// Pause between batches to respect provider rate limits.
pub const BATCH_DELAY: Duration = Duration::from_millis(100);

/// Walk every page of the catalog and concatenate the records.
///
/// Never errors: a failure partway through returns whatever accumulated so
/// far, or an empty list if nothing did. There is no partial-update path;
/// a stale snapshot is rebuilt wholesale by the caller.
pub async fn assemble(
    source: &dyn ProductPageSource,
    batch_size: usize,
    delay: Duration,
) -> Vec<ProductRecord> {
    let batch_size = batch_size.max(1);
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        match source.product_page(batch_size, cursor.as_deref()).await {
            Ok(page) => {
                let fetched = page.products.len();
                all.extend(page.products);
                if !page.page_info.has_next_page || fetched == 0 {
                    break;
                }
                match page.page_info.end_cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
                tokio::time::sleep(delay).await;
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    collected = all.len(),
                    "catalog walk failed, returning partial snapshot"
                );
                break;
            }
        }
    }

    tracing::debug!(products = all.len(), "catalog snapshot assembled");
    all
}
