//! Driftwood Storefront library.
//!
//! This crate provides the storefront checkout API as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod stripe;
pub mod woo;
