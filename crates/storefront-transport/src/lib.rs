//! GraphQL transport for the storefront catalog service.
//!
//! This crate provides:
//! - `GraphqlClient` - One-request execution over HTTPS with timeout
//! - `RetryPolicy` / `BackoffStrategy` - Transient-failure retry schedule
//! - `TransportError` - The transient/permanent failure taxonomy
//!
//! An unconfigured store (missing credentials) is a degraded mode, not an
//! error: `GraphqlClient::execute` returns an empty-shaped success and
//! callers treat it as "no data available".

mod client;
mod error;
mod retry;

pub use client::*;
pub use error::*;
pub use retry::*;
