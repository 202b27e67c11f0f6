//! Driftwood Core - Shared types library.
//!
//! This crate provides common types used across all Driftwood components:
//! - `storefront` - Headless storefront API server
//! - `integration-tests` - End-to-end tests against mocked external services
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Money arithmetic and coupon discount types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
