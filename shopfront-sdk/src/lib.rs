//! Shared wire types for the Shopfront checkout service.
//!
//! `objects` mirrors the upstream storefront API (settings, slots, orders,
//! payments, wallet). `signature` signs hosted-payment return URLs. The
//! `client` module, behind the `client` feature, is a typed HTTP client for
//! the upstream API.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;
