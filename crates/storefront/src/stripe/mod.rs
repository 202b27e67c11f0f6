//! Stripe API client and webhook verification.
//!
//! # Architecture
//!
//! - Checkout Sessions only: the storefront creates a hosted session and
//!   never touches card data
//! - The v1 API is form-encoded; nested params are flattened to
//!   `line_items[0][price_data][unit_amount]`-style keys
//! - Webhook authenticity is HMAC-SHA256 over the raw body with the signing
//!   secret (see [`webhook`]); verification happens before any parsing

mod client;
pub mod types;
pub mod webhook;

pub use client::StripeClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The created session is missing its redirect URL.
    #[error("Session {0} has no redirect URL")]
    MissingRedirectUrl(String),
}
