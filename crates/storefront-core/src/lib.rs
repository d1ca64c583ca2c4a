//! Core types for the storefront catalog data layer.
//!
//! This crate provides:
//! - `StoreConfig` - Store credentials sourced from the process environment
//! - `ProductRecord` - The canonical catalog item shape
//! - `PageInfo` / `ProductPage` / `CursorPage` - Cursor-pagination primitives
//!
//! # Example
//!
//! ```ignore
//! use storefront_core::{StoreConfig, ProductRecord};
//!
//! let config = StoreConfig::from_env();
//! if !config.is_configured() {
//!     // Every fetch degrades to the empty-success path.
//! }
//! ```

mod config;
mod page;
mod product;

pub use config::*;
pub use page::*;
pub use product::*;
