//! Stripe wire types (the subset this storefront consumes).

use std::collections::HashMap;

use serde::Deserialize;

/// Session metadata key carrying the serialized billing contact block.
pub const METADATA_BILLING_DETAILS: &str = "billing_details";
/// Session metadata key carrying the serialized shipping contact block.
pub const METADATA_SHIPPING_DETAILS: &str = "shipping_details";

/// A Checkout Session, as returned on creation and inside webhook events.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Opaque provider-issued session id (`cs_...`).
    pub id: String,
    /// Hosted checkout redirect URL. Present on creation, null afterwards.
    #[serde(default)]
    pub url: Option<String>,
    /// Payment intent id, set once payment is underway.
    #[serde(default)]
    pub payment_intent: Option<String>,
    /// Customer email as entered at checkout.
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Top-level metadata attached at session creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// One line item of a session, from `GET /v1/checkout/sessions/{id}/line_items`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionLineItem {
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<LineItemPrice>,
}

/// Price block of a session line item, with the product expanded so its
/// metadata (product id, cart line id, bundle) is available.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemPrice {
    #[serde(default)]
    pub unit_amount: Option<i64>,
    #[serde(default)]
    pub product: Option<LineItemProduct>,
}

/// Expanded product of a session line item.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemProduct {
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl SessionLineItem {
    /// Product metadata value by key, if the product was expanded.
    #[must_use]
    pub fn product_metadata(&self, key: &str) -> Option<&str> {
        self.price
            .as_ref()?
            .product
            .as_ref()?
            .metadata
            .get(key)
            .map(String::as_str)
    }
}

/// Generic paginated list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct List<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// A promotion code wrapping a coupon.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionCode {
    pub id: String,
    #[serde(default)]
    pub active: bool,
}

/// A Stripe coupon (distinct from the backend's coupon records).
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCoupon {
    pub id: String,
    #[serde(default)]
    pub valid: bool,
}

/// An inbound webhook event.
///
/// `data.object` stays as raw JSON until the event type is known; only
/// recognized types are deserialized further.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

/// Payload container of a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}
