//! Shipping/tax quotes via a provisional backend order.
//!
//! The backend owns the shipping-zone and tax-jurisdiction rules; its only
//! exposed way to evaluate them for an arbitrary cart is to create an order.
//! So the quote service creates a throwaway pending order, reads the
//! computed totals off it, and deletes it again - an opaque pricing oracle.
//!
//! Failure never propagates: an unreachable oracle degrades to a zeroed
//! quote with an `error` message, and the caller renders "unable to
//! calculate" instead of blocking checkout. Cleanup of the provisional order
//! is fire-and-forget; a leaked pending order is an admin annoyance, not a
//! correctness problem.

use tracing::instrument;

use crate::models::{CartLine, Destination, QuoteResult, ShippingMethod};
use crate::woo::{CreateOrderRequest, Order, OrderLineItemRequest, WooClient};

/// Obtain authoritative shipping and tax amounts for a cart + destination.
///
/// Returns a zeroed result without contacting the backend when the cart is
/// empty or the destination has no country ("not yet quotable").
#[instrument(skip(woo, lines), fields(line_count = lines.len(), country = %destination.country))]
pub async fn quote(woo: &WooClient, lines: &[CartLine], destination: &Destination) -> QuoteResult {
    if lines.is_empty() || !destination.is_quotable() {
        return QuoteResult::empty();
    }

    let request = CreateOrderRequest::provisional(
        destination,
        lines.iter().map(|line| OrderLineItemRequest {
            product_id: line.product_id,
            quantity: line.quantity,
            meta_data: Vec::new(),
        }),
    );

    let order = match woo.create_order(&request).await {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(error = %e, "Pricing oracle unavailable, returning provisional zeros");
            return QuoteResult::unavailable(e.to_string());
        }
    };

    let result = quote_from_order(&order);
    discard_provisional(woo.clone(), order.id);
    result
}

/// Read the backend-computed totals off the provisional order.
fn quote_from_order(order: &Order) -> QuoteResult {
    // total_tax already includes shipping_tax; subtotal is what remains of
    // the grand total once shipping and tax are stripped back out.
    let subtotal = order.total - order.shipping_total - order.total_tax;

    QuoteResult {
        shipping: order.shipping_total,
        tax: order.total_tax,
        subtotal,
        shipping_methods: order
            .shipping_lines
            .iter()
            .map(|line| ShippingMethod {
                title: line.method_title.clone(),
                total: line.total,
            })
            .collect(),
        error: None,
    }
}

/// Best-effort delete of the provisional order on a detached task.
///
/// Must never delay or fail the quote response.
fn discard_provisional(woo: WooClient, order_id: i64) {
    tokio::spawn(async move {
        if let Err(e) = woo.delete_order(order_id, true).await {
            tracing::warn!(order_id, error = %e, "Failed to delete provisional quote order");
        }
    });
}
