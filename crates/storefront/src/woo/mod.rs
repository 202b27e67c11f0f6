//! WooCommerce REST API client.
//!
//! # Architecture
//!
//! - WooCommerce is the source of truth for catalog, coupons, and orders -
//!   NO local sync, direct API calls with basic-auth consumer credentials
//! - Shipping and tax rules live in the backend's admin-configured zones;
//!   this crate never recomputes them locally (see [`crate::checkout::quote`])
//!
//! # Example
//!
//! ```rust,ignore
//! use driftwood_storefront::woo::WooClient;
//!
//! let client = WooClient::new(&config.woo, config.backend_timeout)?;
//!
//! // Look up a coupon by exact code
//! let coupon = client.find_coupon("save10").await?;
//!
//! // Create and discard a provisional order
//! let order = client.create_order(&request).await?;
//! client.delete_order(order.id, true).await?;
//! ```

mod client;
pub mod types;

pub use client::WooClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the WooCommerce API.
#[derive(Debug, Error)]
pub enum WooError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_woo_error_display() {
        let err = WooError::Api {
            status: 400,
            message: "woocommerce_rest_invalid_coupon".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error: 400 - woocommerce_rest_invalid_coupon"
        );
    }
}
