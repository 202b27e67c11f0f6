//! Integration test harness for Driftwood.
//!
//! Drives the real checkout router in-process while `wiremock` stands in
//! for the two external services (the WooCommerce backend and the Stripe
//! API), so tests can assert on exactly which calls were made.
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::new().await;
//! let (status, body) = ctx
//!     .post_json("/api/checkout/quote", serde_json::json!({ ... }))
//!     .await;
//! assert_eq!(status, StatusCode::OK);
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;
use tower::ServiceExt;
use wiremock::MockServer;

use driftwood_storefront::config::{StorefrontConfig, StripeConfig, WooConfig};
use driftwood_storefront::routes;
use driftwood_storefront::state::AppState;

/// Webhook signing secret used across all tests.
pub const WEBHOOK_SECRET: &str = "whsec_integration_test_secret";

/// A router wired to mocked external services.
pub struct TestContext {
    app: Router,
    /// Mocked WooCommerce backend.
    pub backend: MockServer,
    /// Mocked Stripe API.
    pub provider: MockServer,
}

impl TestContext {
    /// Start both mock servers and build the application around them.
    pub async fn new() -> Self {
        let backend = MockServer::start().await;
        let provider = MockServer::start().await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "https://shop.test".to_string(),
            currency: "AED".to_string(),
            allowed_countries: vec!["AE".to_string()],
            backend_timeout: Duration::from_millis(750),
            woo: WooConfig {
                api_url: backend.uri(),
                consumer_key: "ck_test".to_string(),
                consumer_secret: SecretString::from("cs_test"),
            },
            stripe: StripeConfig {
                api_url: provider.uri(),
                secret_key: SecretString::from("sk_test"),
                webhook_secret: SecretString::from(WEBHOOK_SECRET),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config).expect("state should build");
        let app = routes::routes().with_state(state);

        Self {
            app,
            backend,
            provider,
        }
    }

    /// POST a JSON body and return status + parsed JSON response.
    pub async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    /// POST a raw webhook body with the given signature header value.
    pub async fn post_webhook(&self, payload: &[u8], signature: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/stripe")
            .header("stripe-signature", signature)
            .body(Body::from(payload.to_vec()))
            .unwrap();

        self.app.clone().oneshot(request).await.unwrap().status()
    }

    /// POST a raw webhook body with no signature header at all.
    pub async fn post_webhook_unsigned(&self, payload: &[u8]) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/stripe")
            .body(Body::from(payload.to_vec()))
            .unwrap();

        self.app.clone().oneshot(request).await.unwrap().status()
    }

    /// Sign a webhook payload the way the provider does.
    pub fn sign(&self, payload: &[u8]) -> String {
        sign_with(payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp())
    }
}

/// Compute a `Stripe-Signature` header value for a payload.
pub fn sign_with(payload: &[u8], secret: &str, timestamp: i64) -> String {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

/// A completed-session webhook event body with the standard metadata blobs.
#[must_use]
pub fn completed_event_body(session_id: &str) -> Vec<u8> {
    let contact = serde_json::json!({
        "firstName": "Aisha", "lastName": "Rahman", "address1": "1 Marina Walk",
        "city": "Dubai", "country": "AE", "email": "aisha@example.net"
    });
    serde_json::json!({
        "id": format!("evt_{session_id}"),
        "type": "checkout.session.completed",
        "data": {"object": {
            "id": session_id,
            "payment_intent": "pi_777",
            "metadata": {
                "billing_details": contact.to_string(),
                "shipping_details": contact.to_string()
            }
        }}
    })
    .to_string()
    .into_bytes()
}
