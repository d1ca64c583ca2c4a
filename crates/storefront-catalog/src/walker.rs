//! Offset resolution over a cursor-only pagination API.

use anyhow::Result;

use crate::source::ProductPageSource;

/// Largest page the provider will serve in one request.
pub const PROVIDER_PAGE_CAP: usize = 250;

/// Safety cap on the count-approximation walk.
pub const MAX_COUNT_WALK: usize = 10_000;

/// Walks cursor-only pages to reach logical offsets.
///
/// The provider exposes no offset parameter, so reaching offset `O` costs
/// `ceil(O / cap)` cursor-only round trips. That cost is the intended
/// trade-off of offset emulation, not something to optimize away here.
#[derive(Debug, Clone, Copy)]
pub struct PaginationWalker {
    cap: usize,
}

impl PaginationWalker {
    /// Create a walker with an explicit provider page cap.
    pub fn new(cap: usize) -> Self {
        Self { cap: cap.max(1) }
    }

    /// Walker for the provider's documented cap.
    pub fn provider_default() -> Self {
        Self::new(PROVIDER_PAGE_CAP)
    }

    /// The configured page cap.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Resolve the cursor positioned after item `target`.
    ///
    /// Returns `None` for `target == 0` (start of the list) without any
    /// request. Otherwise walks forward in chunks of `min(cap, remaining)`,
    /// threading each page's last cursor into the next request. If the
    /// provider runs out of pages early, the cursor reached so far is
    /// returned.
    pub async fn cursor_for_offset(
        &self,
        source: &dyn ProductPageSource,
        target: usize,
    ) -> Result<Option<String>> {
        if target == 0 {
            return Ok(None);
        }

        let mut cursor: Option<String> = None;
        let mut consumed = 0usize;

        while consumed < target {
            let chunk = (target - consumed).min(self.cap);
            let page = source.cursor_page(chunk, cursor.as_deref()).await?;
            if page.cursors.is_empty() {
                break;
            }
            consumed += page.cursors.len();
            cursor = page.last_cursor().map(String::from);
            if !page.page_info.has_next_page {
                break;
            }
        }

        Ok(cursor)
    }

    /// Approximate the total item count by walking cursors forward,
    /// bounded by [`MAX_COUNT_WALK`] so a huge catalog cannot stall the
    /// caller indefinitely.
    pub async fn approximate_count(&self, source: &dyn ProductPageSource) -> Result<usize> {
        let mut cursor: Option<String> = None;
        let mut count = 0usize;

        while count < MAX_COUNT_WALK {
            let chunk = (MAX_COUNT_WALK - count).min(self.cap);
            let page = source.cursor_page(chunk, cursor.as_deref()).await?;
            count += page.cursors.len();
            if page.cursors.is_empty() || !page.page_info.has_next_page {
                break;
            }
            cursor = page.last_cursor().map(String::from);
        }

        Ok(count)
    }
}
