//! Payment provider webhook handler.
//!
//! The signature check runs over the raw body before anything is parsed;
//! a mismatch is a security rejection, not a business-logic branch. Once an
//! event is verified and the payment is known to be real, every downstream
//! failure is acknowledged with 200 - re-delivery cannot fix a backend
//! outage, it can only duplicate work, so those failures go to the error
//! tracker instead.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::checkout::reconcile::{self, ReconcileOutcome};
use crate::state::AppState;
use crate::stripe::types::Event;
use crate::stripe::webhook;

/// Header carrying the delivery signature.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Handle a payment provider event delivery.
///
/// POST /webhooks/stripe
///
/// Responds 400 only on signature failure or a malformed envelope; every
/// verified delivery is acknowledged with 200, including "already
/// processed" and "order creation failed after real payment".
#[instrument(skip_all)]
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!(security = true, "Webhook delivery without signature header");
        return (StatusCode::BAD_REQUEST, "missing signature");
    };

    let secret = state.config().stripe.webhook_secret.expose_secret();
    if let Err(e) = webhook::verify(&body, signature, secret) {
        tracing::warn!(security = true, error = %e, "Webhook signature rejected");
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }

    let event: Event = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook payload unparsable after valid signature");
            return (StatusCode::BAD_REQUEST, "malformed payload");
        }
    };

    match reconcile::process_event(state.woo(), state.stripe(), &event).await {
        Ok(ReconcileOutcome::OrderCreated(order_id)) => {
            tracing::info!(order_id, event_id = %event.id, "Webhook reconciled");
            (StatusCode::OK, "ok")
        }
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            // The payment is real; surface the failure out-of-band and ack
            // so the provider does not retry a delivery that cannot succeed
            // any harder.
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Reconciliation failed after verified payment"
            );
            (StatusCode::OK, "accepted")
        }
    }
}
