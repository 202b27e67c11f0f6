//! Order reconciliation from payment webhook events.
//!
//! A payment session's lifecycle, as seen from here:
//!
//! ```text
//! Created -> Completed -> OrderPosted   (terminal success)
//! Created -> Expired                    (terminal, no order)
//! Created -> PaymentFailed              (terminal, no order)
//! ```
//!
//! The route layer verifies the delivery signature before this module sees
//! anything. For a completed session the handler re-fetches line items from
//! the provider (event payloads omit full detail), reconstructs addresses
//! from the session metadata blobs, and posts exactly one backend order.
//!
//! Idempotence: delivery retries are expected, so creation is guarded by a
//! lookup on the session id stored in order meta. Two concurrent deliveries
//! can both pass that check; creation is therefore followed by a re-list,
//! and the younger duplicate deletes itself. The backend keeps at most one
//! order per session either way.

use tracing::instrument;

use crate::models::ContactDetails;
use crate::stripe::types::{
    CheckoutSession, Event, SessionLineItem, METADATA_BILLING_DETAILS, METADATA_SHIPPING_DETAILS,
};
use crate::stripe::{StripeClient, StripeError};
use crate::woo::{
    CreateOrderRequest, MetaData, OrderLineItemRequest, WooAddress, WooClient, WooError,
    META_BUNDLE, META_CART_LINE_ID, META_PAYMENT_INTENT_ID, META_PAYMENT_SESSION_ID,
};

/// Event type marking a session as paid.
pub const EVENT_COMPLETED: &str = "checkout.session.completed";
/// Event type marking a session as expired unpaid.
pub const EVENT_EXPIRED: &str = "checkout.session.expired";
/// Event type marking an async payment as failed.
pub const EVENT_PAYMENT_FAILED: &str = "checkout.session.async_payment_failed";

/// What handling an event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A backend order was created for the session.
    OrderCreated(i64),
    /// An order for this session already exists; nothing was created.
    AlreadyProcessed,
    /// A terminal no-order event (expired, payment failed) was recorded.
    Recorded,
    /// An event type this handler does not act on.
    Ignored,
}

/// Errors while reconciling a verified event.
///
/// All of these occur after the payment is real, so the route acknowledges
/// the delivery regardless and these become alerts, not retries.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The session object or its metadata blobs are unreadable.
    #[error("unreadable session metadata: {0}")]
    Metadata(String),

    /// Re-fetching session line items from the provider failed.
    #[error("line item fetch: {0}")]
    Provider(#[from] StripeError),

    /// The backend rejected the idempotence lookup or the order creation.
    #[error("backend order: {0}")]
    Backend(#[from] WooError),
}

/// Handle a signature-verified webhook event.
///
/// # Errors
///
/// Returns [`ReconcileError`] when a completed session could not be turned
/// into a backend order. The payment is real in every such case.
#[instrument(skip(woo, stripe, event), fields(event_id = %event.id, event_type = %event.event_type))]
pub async fn process_event(
    woo: &WooClient,
    stripe: &StripeClient,
    event: &Event,
) -> Result<ReconcileOutcome, ReconcileError> {
    match event.event_type.as_str() {
        EVENT_COMPLETED => process_completed(woo, stripe, event).await,
        EVENT_EXPIRED | EVENT_PAYMENT_FAILED => {
            // Observability only: no order exists and none will.
            tracing::info!("Session ended without payment");
            Ok(ReconcileOutcome::Recorded)
        }
        _ => {
            tracing::debug!("Ignoring unhandled event type");
            Ok(ReconcileOutcome::Ignored)
        }
    }
}

async fn process_completed(
    woo: &WooClient,
    stripe: &StripeClient,
    event: &Event,
) -> Result<ReconcileOutcome, ReconcileError> {
    let session: CheckoutSession = serde_json::from_value(event.data.object.clone())
        .map_err(|e| ReconcileError::Metadata(format!("session object: {e}")))?;

    let billing = contact_blob(&session, METADATA_BILLING_DETAILS)?;
    let shipping = contact_blob(&session, METADATA_SHIPPING_DETAILS)?;

    // Retries are routine; an order keyed to this session means we're done.
    let existing = woo.find_orders_by_session(&session.id).await?;
    if let Some(order) = existing.first() {
        tracing::info!(order_id = order.id, session_id = %session.id, "Order already exists for session");
        return Ok(ReconcileOutcome::AlreadyProcessed);
    }

    // Event payloads may omit line-item detail; the session is re-read.
    let items = stripe.list_session_line_items(&session.id).await?;
    let line_items = items
        .iter()
        .map(order_line_from_item)
        .collect::<Result<Vec<_>, _>>()?;

    let request = order_request(&session, &billing, &shipping, line_items);
    let order = woo.create_order(&request).await?;
    tracing::info!(order_id = order.id, session_id = %session.id, "Backend order created");

    // Two deliveries can race past the lookup above. Converge by re-listing
    // and discarding the younger duplicate (ours, if an older one surfaced).
    match woo.find_orders_by_session(&session.id).await {
        Ok(orders) => {
            if orders.iter().any(|o| o.id < order.id) {
                tracing::warn!(
                    order_id = order.id,
                    session_id = %session.id,
                    "Duplicate order detected after concurrent delivery, removing ours"
                );
                if let Err(e) = woo.delete_order(order.id, true).await {
                    tracing::error!(order_id = order.id, error = %e, "Failed to remove duplicate order");
                }
                return Ok(ReconcileOutcome::AlreadyProcessed);
            }
        }
        Err(e) => {
            // The order stands; the duplicate sweep just didn't run.
            tracing::warn!(error = %e, "Post-create duplicate check failed");
        }
    }

    Ok(ReconcileOutcome::OrderCreated(order.id))
}

/// Parse one of the serialized contact blocks out of session metadata.
///
/// The blobs are a versioned contract written at session creation; an
/// unparsable blob is a reconciliation error, not a panic.
fn contact_blob(session: &CheckoutSession, key: &str) -> Result<ContactDetails, ReconcileError> {
    let raw = session
        .metadata
        .get(key)
        .ok_or_else(|| ReconcileError::Metadata(format!("missing {key}")))?;
    serde_json::from_str(raw).map_err(|e| ReconcileError::Metadata(format!("{key}: {e}")))
}

/// Map a provider line item back to a backend order line.
fn order_line_from_item(item: &SessionLineItem) -> Result<OrderLineItemRequest, ReconcileError> {
    let product_id: i64 = item
        .product_metadata("product_id")
        .ok_or_else(|| ReconcileError::Metadata("line item missing product_id".to_string()))?
        .parse()
        .map_err(|_| ReconcileError::Metadata("line item product_id not numeric".to_string()))?;

    let mut meta_data = Vec::new();
    if let Some(cart_line_id) = item.product_metadata(META_CART_LINE_ID) {
        meta_data.push(MetaData::string(META_CART_LINE_ID, cart_line_id));
    }
    if let Some(bundle) = item.product_metadata(META_BUNDLE) {
        // Stored as a JSON string at session creation; keep it verbatim if
        // it no longer parses rather than dropping it.
        let value = serde_json::from_str(bundle)
            .unwrap_or_else(|_| serde_json::Value::String(bundle.to_string()));
        meta_data.push(MetaData {
            key: META_BUNDLE.to_string(),
            value,
        });
    }

    Ok(OrderLineItemRequest {
        product_id,
        quantity: item.quantity.max(1),
        meta_data,
    })
}

fn order_request(
    session: &CheckoutSession,
    billing: &ContactDetails,
    shipping: &ContactDetails,
    line_items: Vec<OrderLineItemRequest>,
) -> CreateOrderRequest {
    CreateOrderRequest {
        status: "processing".to_string(),
        set_paid: true,
        billing: WooAddress::from(billing),
        shipping: WooAddress::from(shipping),
        line_items,
        payment_method: Some("stripe".to_string()),
        payment_method_title: Some("Stripe".to_string()),
        transaction_id: session.payment_intent.clone(),
        meta_data: vec![
            MetaData::string(META_PAYMENT_SESSION_ID, session.id.clone()),
            MetaData::string(
                META_PAYMENT_INTENT_ID,
                session.payment_intent.clone().unwrap_or_default(),
            ),
        ],
    }
}
