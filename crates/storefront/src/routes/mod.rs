//! HTTP route handlers for the checkout API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Checkout API (JSON, called by the browser cart)
//! POST /api/checkout/quote     - Shipping/tax quote for cart + destination
//! POST /api/checkout/coupon    - Validate a discount code
//! POST /api/checkout/session   - Create a hosted payment session
//!
//! # Webhooks (raw body, signature-verified)
//! POST /webhooks/stripe        - Payment provider event delivery
//! ```
//!
//! Quote responses are always HTTP 200: pricing-oracle failures travel
//! in-band in the `error` field so the UI never treats them as page errors.

pub mod checkout;
pub mod webhooks;

use axum::{routing::get, routing::post, Router};

use crate::state::AppState;

/// Create the checkout API router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/quote", post(checkout::quote))
        .route("/coupon", post(checkout::validate_coupon))
        .route("/session", post(checkout::create_session))
}

/// Create the webhook router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(webhooks::stripe))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/checkout", checkout_routes())
        .nest("/webhooks", webhook_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
