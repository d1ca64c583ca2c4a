//! Catalog fetch orchestration for the storefront.
//!
//! This crate assembles full catalog snapshots from a cursor-only,
//! page-capped GraphQL API and derives bounded segment views from them:
//!
//! - `PaginationWalker` - Converts logical offsets into provider cursors
//! - `snapshot` - Fail-soft assembly of the complete catalog
//! - `segments` - Pure, bounded derivations over a snapshot
//! - `CatalogService` - The storefront-facing API; never returns an error
//!   across its boundary, only the requested shape or a safe default
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use storefront_catalog::CatalogService;
//!
//! let service = CatalogService::from_env()?;
//! let janitor = service.start_janitor();
//! let featured = service.best_sellers(8).await;
//! // ... on shutdown:
//! janitor.shutdown().await;
//! ```

mod segments;
mod service;
mod snapshot;
mod source;
mod walker;

pub use segments::*;
pub use service::*;
pub use snapshot::*;
pub use source::*;
pub use walker::*;
