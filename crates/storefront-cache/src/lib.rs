//! Tiered caching for the storefront data layer.
//!
//! This crate provides:
//! - `TaggedCache` - Tag-addressable, TTL-based layer for cross-request reuse
//! - `MemoryCache` - Size/age-bounded in-process map for hot data
//! - `DedupRegistry` - Collapses concurrent identical in-flight fetches
//! - `CacheService` - The three above as one explicitly constructed value
//! - Janitor - Periodic sweep enforcing age and memory bounds
//!
//! The janitor never starts implicitly: long-lived processes call
//! [`CacheService::start_janitor`] from their entry point and shut the
//! returned handle down on exit.

mod dedup;
mod entry;
mod janitor;
mod memory;
mod service;
mod tagged;

pub use dedup::*;
pub use entry::*;
pub use janitor::*;
pub use memory::*;
pub use service::*;
pub use tagged::*;
